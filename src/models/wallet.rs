use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user balance cache, one row per user.
///
/// `balance` is derived state: it must always equal the signed sum of the
/// user's ledger entries. It is written only inside the balance engine's
/// atomic scope; the ledger aggregate remains the source of truth.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: Uuid,
    pub balance: i64,
    pub updated_at: NaiveDateTime,
}

/// Balance as recomputed from the ledger by the auditor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: i64,
}
