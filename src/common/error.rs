use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// As mensagens internas (Display) são para os logs; as respostas HTTP
// usam as mensagens em inglês que o site expõe ao usuário final.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erro de entrada com mensagem pronta (ex: "Referral 2: a valid email is required")
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Limite de submissões excedido")]
    RateLimited,

    // O banco de dados não foi configurado (DATABASE_URL ausente).
    // Diferente de uma falha transitória: a app sobe, mas responde 503 aqui.
    #[error("Banco de dados não configurado")]
    ServiceUnavailable,

    #[error("Token de aprovação inválido")]
    InvalidToken,

    #[error("Sessão do portal inválida ou ausente")]
    Unauthorized,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(message) => {
                let body = Json(json!({ "error": message }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many submissions. Please try again later.",
            ),
            AppError::ServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Database not configured")
            }
            AppError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid or expired token"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::NotFound(resource) => {
                let body = Json(json!({ "error": format!("{resource} not found") }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o usuário recebe algo genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred. Please try again.",
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
