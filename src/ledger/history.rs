//! History Reader
//!
//! Read-only view over the ledger. No unit of work, no locks: the result may
//! miss a transfer that commits concurrently with the read.

use std::sync::Arc;

use tracing::debug;

use super::models::Transaction;
use super::store::Ledger;
use crate::core_types::OwnerId;
use crate::persistence::StoreError;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 500;

pub struct HistoryReader<S> {
    store: Arc<S>,
    default_limit: usize,
    max_limit: usize,
}

impl<S> Clone for HistoryReader<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}

impl<S: Ledger> HistoryReader<S> {
    pub fn new(store: Arc<S>, default_limit: usize, max_limit: usize) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            store,
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    /// Entries involving `owner`, newest first.
    ///
    /// An unknown owner yields an empty list.
    pub async fn history(
        &self,
        owner: OwnerId,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let limit = self.effective_limit(limit);
        let entries = self.store.list_by_owner(owner, limit).await?;
        debug!(owner = %owner, limit, returned = entries.len(), "History read");
        Ok(entries)
    }

    /// Positive requests are capped at the maximum; anything else gets the default
    pub fn effective_limit(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 => usize::try_from(n)
                .unwrap_or(self.max_limit)
                .min(self.max_limit),
            _ => self.default_limit,
        }
    }
}

/// Lenient query parsing: anything that is not an integer is treated as absent
pub fn parse_limit(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

/// Newest first, ties broken by id descending
pub fn newest_first(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
