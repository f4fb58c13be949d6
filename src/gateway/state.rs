use std::sync::Arc;

use crate::funds::FundsService;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Funds core, backend chosen at startup
    pub funds: Arc<dyn FundsService>,
    /// HS256 key for bearer tokens
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(funds: Arc<dyn FundsService>, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            funds,
            jwt_secret: jwt_secret.into(),
        }
    }
}
