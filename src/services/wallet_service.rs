//! Balance engine: the ledger mutation core.
//!
//! Every mutation runs inside one atomic scope against the ledger store:
//! read the wallet under lock, validate, append the ledger entry and
//! rewrite the cached balance, then commit. Splitting the read and the
//! append across scopes would let two concurrent debits both observe a
//! sufficient balance and double-spend it.

use crate::error::{AppError, AppResult};
use crate::models::{NewTransaction, Transaction, TransactionType};
use crate::repositories::LedgerStore;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Service applying credits and debits to a user's wallet
pub struct WalletService<L> {
    ledger: Arc<L>,
}

impl<L: LedgerStore> WalletService<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Append a ledger entry and update the cached balance atomically.
    ///
    /// Fails with `NotFound` when the wallet does not exist and with
    /// `InsufficientFunds` when a debit would drive the balance negative;
    /// in both cases the scope is aborted and nothing is persisted.
    pub async fn apply_transaction(
        &self,
        user_id: Uuid,
        amount: i64,
        tx_type: TransactionType,
    ) -> AppResult<()> {
        // The request layer validates this already; re-checked here so the
        // ledger can never record a non-positive amount.
        if amount <= 0 {
            return Err(AppError::Validation(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        let mut scope = self.ledger.begin().await.map_err(AppError::from)?;

        let outcome = self.mutate(&mut scope, user_id, amount, tx_type).await;

        match outcome {
            Ok(()) => {
                self.ledger.commit(scope).await.map_err(AppError::from)?;
                debug!(user_id = %user_id, amount, tx_type = tx_type.as_str(), "ledger entry committed");
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = self.ledger.rollback(scope).await {
                    warn!(user_id = %user_id, error = %rollback_err, "scope rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn mutate(
        &self,
        scope: &mut L::Scope,
        user_id: Uuid,
        amount: i64,
        tx_type: TransactionType,
    ) -> AppResult<()> {
        let wallet = self
            .ledger
            .wallet_for_update(scope, user_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("wallet for user {}", user_id)))?;

        let new_balance = wallet.balance + tx_type.signed(amount);
        if new_balance < 0 {
            return Err(AppError::InsufficientFunds {
                balance: wallet.balance,
                requested: amount,
            });
        }

        self.ledger
            .append_transaction(
                scope,
                &NewTransaction {
                    user_id,
                    amount,
                    transaction_type: tx_type,
                },
            )
            .await
            .map_err(AppError::from)?;

        self.ledger
            .write_balance(scope, user_id, new_balance)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    /// Ledger entries newest first, optionally filtered by type
    pub async fn list_transactions(
        &self,
        filter: Option<TransactionType>,
    ) -> AppResult<Vec<Transaction>> {
        self.ledger
            .list_transactions(filter)
            .await
            .map_err(AppError::from)
    }
}
