//! Wallet Store
//!
//! One balance per owner. Rows are the only mutable shared state in the
//! funds core.

pub mod models;
pub mod store;

pub use models::{Wallet, next_update_time};
pub use store::WalletStore;
