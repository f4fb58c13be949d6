//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{MockOwnerResponse, TopUpRequest, TransferRequest};
use crate::ledger::{Transaction, TransactionKind, TransactionStatus};
use crate::wallet::Wallet;

/// HS256 JWT bearer scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 token whose `sub` is the owner id"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet Ledger API",
        version = "1.0.0",
        description = "Custodial wallet balances, transfers and an append-only ledger.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::wallet::get_balance,
        crate::gateway::handlers::wallet::top_up,
        crate::gateway::handlers::transactions::transfer,
        crate::gateway::handlers::transactions::history,
    ),
    components(
        schemas(
            HealthResponse,
            Wallet,
            Transaction,
            TransactionKind,
            TransactionStatus,
            TopUpRequest,
            TransferRequest,
            MockOwnerResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Wallet", description = "Balance and top-up (auth required)"),
        (name = "Transactions", description = "Transfers and history (auth required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
