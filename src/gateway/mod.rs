//! HTTP Gateway
//!
//! Thin request layer over [`crate::funds::FundsService`]: bearer-token
//! identity, string amount parsing, and the `{code, msg, data}` envelope.

pub mod auth;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

/// Assemble every route on one router
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Owner Routes - Protected by JWT
    // ==========================================================================
    let wallet_routes = Router::new()
        .route("/balance", get(handlers::get_balance))
        .route("/topup", post(handlers::top_up))
        .layer(from_fn_with_state(state.clone(), auth::jwt_auth_middleware));

    let transaction_routes = Router::new()
        .route("/transfer", post(handlers::transfer))
        .route("/history", get(handlers::history))
        .layer(from_fn_with_state(state.clone(), auth::jwt_auth_middleware));

    let app = Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/wallet", wallet_routes)
        .nest("/api/v1/transactions", transaction_routes);

    // [SECURITY] Mock API routes - only compiled when 'mock-api' feature is enabled.
    // Production builds MUST be compiled with `--no-default-features` to exclude this.
    #[cfg(feature = "mock-api")]
    let app = app.nest(
        "/internal/mock",
        Router::new().route("/owners", post(handlers::mock::create_owner)),
    );

    app.with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind `host:port` and serve until the process is stopped
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            port
        )
    })?;

    tracing::info!(addr = %addr, "Gateway listening");
    tracing::info!("API Docs: http://{}/docs", addr);
    #[cfg(feature = "mock-api")]
    tracing::warn!("mock-api enabled: POST /internal/mock/owners provisions owners without credentials");

    axum::serve(listener, app).await?;
    Ok(())
}
