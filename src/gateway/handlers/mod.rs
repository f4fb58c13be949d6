//! HTTP handlers

pub mod health;
#[cfg(feature = "mock-api")]
pub mod mock;
pub mod transactions;
pub mod wallet;

pub use health::{HealthResponse, health_check};
pub use transactions::{history, transfer};
pub use wallet::{get_balance, top_up};
