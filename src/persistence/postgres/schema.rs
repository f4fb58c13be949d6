//! PostgreSQL schema, created idempotently at startup

use anyhow::Result;
use sqlx::PgPool;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users_tb (
    user_id     UUID PRIMARY KEY,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_WALLETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wallets_tb (
    wallet_id   UUID PRIMARY KEY,
    user_id     UUID NOT NULL UNIQUE REFERENCES users_tb(user_id),
    balance     NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// No foreign keys: failed-transfer audit rows may name a sender without a wallet
const CREATE_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions_tb (
    transaction_id  TEXT PRIMARY KEY,
    sender_id       UUID,
    receiver_id     UUID NOT NULL,
    amount          NUMERIC(15, 2) NOT NULL CHECK (amount > 0),
    kind            SMALLINT NOT NULL,
    status          SMALLINT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_transactions_sender ON transactions_tb(sender_id)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_receiver ON transactions_tb(receiver_id)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_created_at ON transactions_tb(created_at DESC)",
];

/// Create tables and indexes if they do not exist
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing PostgreSQL schema...");

    sqlx::query(CREATE_USERS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", "Failed to create users_tb", e))?;

    sqlx::query(CREATE_WALLETS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", "Failed to create wallets_tb", e))?;

    sqlx::query(CREATE_TRANSACTIONS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", "Failed to create transactions_tb", e))?;

    for ddl in CREATE_INDEXES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create index ({}): {}", ddl, e))?;
    }

    tracing::info!("PostgreSQL schema ready");
    Ok(())
}
