use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; without it the service runs on the in-memory store
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub postgres_pool: PoolConfig,
    /// HS256 key for bearer tokens
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default)]
    pub funds: FundsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// PostgreSQL pool sizing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    50
}

fn default_acquire_timeout_ms() -> u64 {
    5_000
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

/// Funds core tuning
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FundsConfig {
    /// Upper bound on a row-lock wait before the unit of work is abandoned
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    #[serde(default = "default_history_limit")]
    pub history_default_limit: usize,
    #[serde(default = "default_history_max_limit")]
    pub history_max_limit: usize,
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_history_limit() -> usize {
    50
}

fn default_history_max_limit() -> usize {
    500
}

impl Default for FundsConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            history_default_limit: default_history_limit(),
            history_max_limit: default_history_max_limit(),
        }
    }
}

impl FundsConfig {
    /// Never zero: PostgreSQL reads `lock_timeout = 0` as "wait forever"
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms.max(1))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.lock_timeout_ms > 0, "funds.lock_timeout_ms must be at least 1");
        anyhow::ensure!(
            self.history_default_limit <= self.history_max_limit,
            "funds.history_default_limit exceeds funds.history_max_limit"
        );
        Ok(())
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, then apply environment overrides
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.funds.validate()?;
        Ok(config)
    }

    /// `DATABASE_URL`, `JWT_SECRET` and `GATEWAY_PORT` take precedence over the file
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.postgres_url = Some(url);
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            self.jwt_secret = secret;
        }
        if let Some(port) = lookup("GATEWAY_PORT").and_then(|v| v.parse().ok()) {
            self.gateway.port = port;
        }
    }
}
