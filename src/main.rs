//! Wallet Ledger gateway
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────────┐
//! │  Config  │───▶│ Gateway  │───▶│  Funds   │───▶│ PgStore /    │
//! │  (YAML)  │    │ (JWT)    │    │ (coord.) │    │ MemoryStore  │
//! └──────────┘    └──────────┘    └──────────┘    └──────────────┘
//! ```
//!
//! Flags: `--env/-e <name>` (default `dev`), `--port <port>`, `--in-memory`.

use std::sync::Arc;

use anyhow::Context;

use wallet_ledger::config::AppConfig;
use wallet_ledger::db::Database;
use wallet_ledger::funds::{Funds, FundsService};
use wallet_ledger::gateway::{self, state::AppState};
use wallet_ledger::persistence::{MemoryStore, PgStore, postgres::init_schema};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn use_in_memory() -> bool {
    std::env::args().any(|a| a == "--in-memory")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = wallet_ledger::logging::init_logging(&app_config);

    tracing::info!(
        env = %env,
        version = env!("GIT_HASH"),
        "Starting wallet ledger"
    );

    if app_config.jwt_secret.is_empty() {
        anyhow::bail!("jwt_secret is empty: set it in config/{}.yaml or JWT_SECRET", env);
    }

    let lock_timeout = app_config.funds.lock_timeout();
    let funds: Arc<dyn FundsService> = match app_config.postgres_url.as_deref() {
        Some(url) if !use_in_memory() => {
            let db = Database::connect(url, &app_config.postgres_pool)
                .await
                .context("Failed to connect to PostgreSQL")?;
            init_schema(db.pool()).await?;
            tracing::info!(lock_timeout_ms = app_config.funds.lock_timeout_ms, "Using PostgreSQL store");
            let store = Arc::new(PgStore::new(db, lock_timeout));
            Arc::new(Funds::new(store, &app_config.funds))
        }
        _ => {
            tracing::warn!("Using in-memory store: balances are lost on exit");
            let store = Arc::new(MemoryStore::new(lock_timeout));
            Arc::new(Funds::new(store, &app_config.funds))
        }
    };

    let state = Arc::new(AppState::new(funds, app_config.jwt_secret.as_str()));
    gateway::run_server(&app_config.gateway.host, app_config.gateway.port, state).await
}
