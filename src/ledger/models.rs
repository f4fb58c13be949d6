//! Ledger entry types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{OwnerId, TransactionId};
use crate::money::Amount;

/// Kind of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum TransactionKind {
    TopUp = 1,
    Transfer = 2,
}

impl TransactionKind {
    /// Numeric ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransactionKind::TopUp),
            2 => Some(TransactionKind::Transfer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::TopUp => "topup",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome recorded with the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum TransactionStatus {
    Success = 1,
    Failed = 2,
}

impl TransactionStatus {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransactionStatus::Success),
            2 => Some(TransactionStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable ledger entry.
///
/// Never updated or deleted once written. A failed transfer and its later
/// successful retry are two distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    #[schema(value_type = String, example = "01HV3K8J6Z9Q2W4E5R7T8Y0U1I")]
    pub id: TransactionId,
    /// Absent for top-ups
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub sender_id: Option<OwnerId>,
    #[schema(value_type = String)]
    pub receiver_id: OwnerId,
    #[schema(value_type = String, example = "30.00")]
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Transfer entry; the identifier is assigned here, before insert
    pub fn transfer(
        sender: OwnerId,
        receiver: OwnerId,
        amount: Amount,
        status: TransactionStatus,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            sender_id: Some(sender),
            receiver_id: receiver,
            amount,
            kind: TransactionKind::Transfer,
            status,
            created_at: Utc::now(),
        }
    }

    /// Successful top-up entry (top-ups have no sender)
    pub fn top_up(receiver: OwnerId, amount: Amount) -> Self {
        Self {
            id: TransactionId::new(),
            sender_id: None,
            receiver_id: receiver,
            amount,
            kind: TransactionKind::TopUp,
            status: TransactionStatus::Success,
            created_at: Utc::now(),
        }
    }

    /// True if `owner` is the sender or the receiver
    pub fn involves(&self, owner: OwnerId) -> bool {
        self.receiver_id == owner || self.sender_id == Some(owner)
    }

    pub fn is_success(&self) -> bool {
        self.status == TransactionStatus::Success
    }
}
