//! Ledger store: wallets (mutable balance cache) plus the append-only
//! transaction ledger, with an atomic scope for balance mutations.
//!
//! The scope contract is what makes debit validation safe under
//! concurrency: two scopes touching the same wallet row serialize, so the
//! second always decides against the first's committed balance.

use crate::error::RepositoryError;
use crate::models::{NewTransaction, Transaction, TransactionType, Wallet};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction as PgTransaction};
use uuid::Uuid;

/// Narrow interface over the wallet/ledger store.
///
/// `Scope` is one atomic unit of work: everything staged through it either
/// commits in full or has no observable effect.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Scope: Send;

    /// Create the wallet row for a user with balance 0
    async fn create_wallet(&self, user_id: Uuid) -> Result<Wallet, RepositoryError>;

    /// Read a wallet outside any scope (no lock taken)
    async fn find_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, RepositoryError>;

    /// Delete a user's wallet row
    async fn delete_wallet(&self, user_id: Uuid) -> Result<(), RepositoryError>;

    /// Open an atomic scope
    async fn begin(&self) -> Result<Self::Scope, RepositoryError>;

    /// Commit everything staged in the scope
    async fn commit(&self, scope: Self::Scope) -> Result<(), RepositoryError>;

    /// Abort the scope, discarding staged writes
    async fn rollback(&self, scope: Self::Scope) -> Result<(), RepositoryError>;

    /// Read a wallet inside the scope, excluding concurrent scopes from
    /// the same row until this one resolves
    async fn wallet_for_update(
        &self,
        scope: &mut Self::Scope,
        user_id: Uuid,
    ) -> Result<Option<Wallet>, RepositoryError>;

    /// Append a ledger entry inside the scope
    async fn append_transaction(
        &self,
        scope: &mut Self::Scope,
        entry: &NewTransaction,
    ) -> Result<Transaction, RepositoryError>;

    /// Overwrite the cached balance inside the scope
    async fn write_balance(
        &self,
        scope: &mut Self::Scope,
        user_id: Uuid,
        balance: i64,
    ) -> Result<(), RepositoryError>;

    /// Signed sum of the user's ledger entries, ignoring the cached
    /// balance entirely
    async fn aggregate_balance(&self, user_id: Uuid) -> Result<i64, RepositoryError>;

    /// All ledger entries, newest first, optionally filtered by type
    async fn list_transactions(
        &self,
        filter: Option<TransactionType>,
    ) -> Result<Vec<Transaction>, RepositoryError>;
}

/// PostgreSQL-backed ledger store.
///
/// The atomic scope is a database transaction; `wallet_for_update` takes a
/// `FOR UPDATE` row lock so concurrent scopes on the same wallet serialize.
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Scope = PgTransaction<'static, Postgres>;

    async fn create_wallet(&self, user_id: Uuid) -> Result<Wallet, RepositoryError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO wallets (user_id, balance, updated_at)
            VALUES ($1, 0, NOW())
            RETURNING user_id, balance, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(wallet)
    }

    async fn find_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, RepositoryError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            SELECT user_id, balance, updated_at
            FROM wallets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(wallet)
    }

    async fn delete_wallet(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn begin(&self) -> Result<Self::Scope, RepositoryError> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, scope: Self::Scope) -> Result<(), RepositoryError> {
        scope.commit().await?;
        Ok(())
    }

    async fn rollback(&self, scope: Self::Scope) -> Result<(), RepositoryError> {
        scope.rollback().await?;
        Ok(())
    }

    async fn wallet_for_update(
        &self,
        scope: &mut Self::Scope,
        user_id: Uuid,
    ) -> Result<Option<Wallet>, RepositoryError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            SELECT user_id, balance, updated_at
            FROM wallets
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *scope)
        .await?;

        Ok(wallet)
    }

    async fn append_transaction(
        &self,
        scope: &mut Self::Scope,
        entry: &NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        let record = Transaction {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            amount: entry.amount,
            transaction_type: entry.transaction_type.as_str().to_string(),
            created_at: Utc::now().naive_utc(),
        };

        sqlx::query(
            r#"
            INSERT INTO transactions (id, user_id, amount, transaction_type, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.amount)
        .bind(&record.transaction_type)
        .bind(record.created_at)
        .execute(&mut *scope)
        .await?;

        Ok(record)
    }

    async fn write_balance(
        &self,
        scope: &mut Self::Scope,
        user_id: Uuid,
        balance: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE wallets
            SET balance = $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(balance)
        .execute(&mut *scope)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "wallet for user {}",
                user_id
            )));
        }

        Ok(())
    }

    async fn aggregate_balance(&self, user_id: Uuid) -> Result<i64, RepositoryError> {
        // SUM(BIGINT) widens to NUMERIC in Postgres, hence the cast back
        let amount = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(
                SUM(
                    CASE
                        WHEN transaction_type = 'CREDIT' THEN amount
                        ELSE -amount
                    END
                ),
                0
            )::BIGINT AS amount
            FROM transactions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(amount)
    }

    async fn list_transactions(
        &self,
        filter: Option<TransactionType>,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let transactions = match filter {
            Some(tx_type) => {
                sqlx::query_as::<_, Transaction>(
                    r#"
                    SELECT id, user_id, amount, transaction_type, created_at
                    FROM transactions
                    WHERE transaction_type = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(tx_type.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Transaction>(
                    r#"
                    SELECT id, user_id, amount, transaction_type, created_at
                    FROM transactions
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(transactions)
    }
}
