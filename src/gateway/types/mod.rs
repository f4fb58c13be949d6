//! Gateway types module
//!
//! - [`response`]: envelope, `ApiError`, error codes
//! - [`requests`]: request bodies and query parameters

pub mod requests;
pub mod response;

pub use requests::{HistoryQuery, MockOwnerResponse, TopUpRequest, TransferRequest};
pub use response::{ApiError, ApiResponse, ApiResult, error_codes, ok};
