//! Balance auditor: recomputes a user's balance from the ledger alone.
//!
//! Read path deliberately decoupled from the cached wallet balance, so
//! balance reads never wait on the engine's write-side locking and the
//! result doubles as a drift check against the cache.

use crate::error::{AppError, AppResult};
use crate::models::Balance;
use crate::repositories::LedgerStore;
use std::sync::Arc;
use uuid::Uuid;

pub struct BalanceAuditor<L> {
    ledger: Arc<L>,
}

impl<L: LedgerStore> BalanceAuditor<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Signed sum of the user's ledger entries.
    ///
    /// `NotFound` is scoped strictly to a missing wallet; a wallet with no
    /// transactions yields zero.
    pub async fn compute_balance(&self, user_id: Uuid) -> AppResult<Balance> {
        self.ledger
            .find_wallet(user_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("wallet for user {}", user_id)))?;

        let amount = self
            .ledger
            .aggregate_balance(user_id)
            .await
            .map_err(AppError::from)?;

        Ok(Balance { amount })
    }
}
