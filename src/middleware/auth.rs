// src/middleware/auth.rs
//
// Duas guardas:
//  - admin_guard: chave estática no header `x-admin-key` para /api/admin.
//    Sem ADMIN_API_KEY configurada a guarda libera tudo (avisado no boot).
//  - ClientSession: extrator do portal, valida o bearer token assinado e
//    entrega o e-mail do cliente ao handler.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, services::tokens};

const ADMIN_KEY_HEADER: &str = "x-admin-key";

pub async fn admin_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = &state.admin_api_key {
        let provided = request
            .headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(AppError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}

// Sessão do portal: `Authorization: Bearer email.assinatura`.
pub struct ClientSession {
    pub client_email: String,
}

impl FromRequestParts<AppState> for ClientSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let client_email =
            tokens::verify_portal_session(&state.approve_token_secret, bearer.token())
                .ok_or(AppError::Unauthorized)?;
        Ok(Self { client_email })
    }
}
