//! Ledger
//!
//! Append-only record of every money movement, successful or failed.

pub mod history;
pub mod models;
pub mod store;

pub use history::{HistoryReader, parse_limit};
pub use models::{Transaction, TransactionKind, TransactionStatus};
pub use store::Ledger;
