// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::admin_guard;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é aceitável aqui: se a configuração falhar, a aplicação não
    // deve iniciar.
    let app_state = AppState::from_env()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Migrações só quando há banco; sem DATABASE_URL o servidor sobe em modo
    // degradado (endpoints de persistência respondem 503).
    if let Some(store) = &app_state.store {
        sqlx::migrate!()
            .run(&store.pool)
            .await
            .expect("Falha ao rodar as migrações do banco de dados.");
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    // Rotas públicas: intake de leads e indicações, aprovação e webhooks
    let public_routes = Router::new()
        .route("/leads", post(handlers::leads::submit_lead))
        .route("/leads/{id}/approve", get(handlers::leads::approve_lead))
        .route("/referrals", post(handlers::referrals::submit_referrals))
        .route("/webhooks/sms", post(handlers::webhooks::inbound_sms));

    // Rotas do admin, atrás da chave estática
    let admin_routes = Router::new()
        .route("/leads", get(handlers::admin_leads::list_leads))
        .route(
            "/leads/{id}",
            get(handlers::admin_leads::get_lead).patch(handlers::admin_leads::patch_lead),
        )
        .route("/leads/{id}/convert", post(handlers::admin_leads::convert_lead))
        .route("/referrals", get(handlers::admin_referrals::list_referrers))
        .route("/metrics", get(handlers::metrics::dashboard_metrics))
        .route("/ai/polish-reply", post(handlers::admin_ai::polish_reply))
        .route(
            "/projects",
            get(handlers::admin_projects::list_projects)
                .post(handlers::admin_projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::admin_projects::get_project)
                .patch(handlers::admin_projects::patch_project),
        )
        .route("/projects/{id}/phases", post(handlers::admin_projects::add_phase))
        .route(
            "/projects/{id}/phases/{phase_id}",
            post(handlers::admin_projects::add_milestone)
                .delete(handlers::admin_projects::delete_phase),
        )
        .route(
            "/projects/{id}/milestones/{m_id}",
            patch(handlers::admin_projects::patch_milestone)
                .delete(handlers::admin_projects::delete_milestone),
        )
        .route(
            "/projects/{id}/milestones/{m_id}/reorder",
            post(handlers::admin_projects::reorder_milestone),
        )
        .route("/projects/{id}/demos", post(handlers::admin_projects::create_demo))
        .route(
            "/projects/{id}/demos/{demo_id}",
            axum::routing::delete(handlers::admin_projects::delete_demo),
        )
        .route(
            "/projects/{id}/questions/{q_id}/reply",
            post(handlers::admin_projects::reply_question),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            admin_guard,
        ));

    // Portal do cliente (sessão assinada via Bearer; o magic link é público)
    let portal_routes = Router::new()
        .route(
            "/auth/magic-link",
            post(handlers::portal::request_magic_link),
        )
        .route("/projects", get(handlers::portal::list_projects))
        .route("/projects/{id}", get(handlers::portal::project_detail))
        .route(
            "/projects/{id}/questions",
            post(handlers::portal::ask_question),
        );

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/portal", portal_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
