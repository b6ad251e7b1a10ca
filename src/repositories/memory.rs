//! In-memory store implementations.
//!
//! These back the test suite (and local experimentation) without a running
//! Postgres. They honor the same contracts as the Pg stores: the ledger
//! scope stages writes and applies them only on commit, and scopes
//! serialize against each other. The user store can be told to fail its
//! next operation, which is how the provisioning saga's failure paths are
//! exercised.

use crate::error::RepositoryError;
use crate::models::{NewTransaction, NewUser, Transaction, TransactionType, User, Wallet};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct LedgerState {
    wallets: HashMap<Uuid, Wallet>,
    // Append order doubles as the tie-breaker for created_at ordering
    transactions: Vec<Transaction>,
}

/// In-memory ledger store
#[derive(Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
    fail_create_wallet: AtomicBool,
}

/// Atomic scope over the in-memory ledger.
///
/// Holding the state guard for the lifetime of the scope is what
/// serializes concurrent scopes; staged writes apply at commit and are
/// discarded on rollback.
pub struct MemoryScope {
    guard: OwnedMutexGuard<LedgerState>,
    staged_entries: Vec<Transaction>,
    staged_balance: Option<(Uuid, i64)>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_wallet` call fail
    pub fn fail_next_wallet_creation(&self) {
        self.fail_create_wallet.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl super::LedgerStore for MemoryLedgerStore {
    type Scope = MemoryScope;

    async fn create_wallet(&self, user_id: Uuid) -> Result<Wallet, RepositoryError> {
        if self.fail_create_wallet.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "wallet store rejected creation".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        if state.wallets.contains_key(&user_id) {
            return Err(RepositoryError::Duplicate(format!(
                "wallet for user {}",
                user_id
            )));
        }

        let wallet = Wallet {
            user_id,
            balance: 0,
            updated_at: Utc::now().naive_utc(),
        };
        state.wallets.insert(user_id, wallet.clone());

        Ok(wallet)
    }

    async fn find_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.wallets.get(&user_id).cloned())
    }

    async fn delete_wallet(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.wallets.remove(&user_id);
        Ok(())
    }

    async fn begin(&self) -> Result<Self::Scope, RepositoryError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(MemoryScope {
            guard,
            staged_entries: Vec::new(),
            staged_balance: None,
        })
    }

    async fn commit(&self, mut scope: Self::Scope) -> Result<(), RepositoryError> {
        for entry in scope.staged_entries.drain(..) {
            scope.guard.transactions.push(entry);
        }
        if let Some((user_id, balance)) = scope.staged_balance.take() {
            if let Some(wallet) = scope.guard.wallets.get_mut(&user_id) {
                wallet.balance = balance;
                wallet.updated_at = Utc::now().naive_utc();
            }
        }
        Ok(())
    }

    async fn rollback(&self, scope: Self::Scope) -> Result<(), RepositoryError> {
        drop(scope);
        Ok(())
    }

    async fn wallet_for_update(
        &self,
        scope: &mut Self::Scope,
        user_id: Uuid,
    ) -> Result<Option<Wallet>, RepositoryError> {
        Ok(scope.guard.wallets.get(&user_id).cloned())
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
        scope.staged_entries.push(record.clone());
        Ok(record)
    }

    async fn write_balance(
        &self,
        scope: &mut Self::Scope,
        user_id: Uuid,
        balance: i64,
    ) -> Result<(), RepositoryError> {
        if !scope.guard.wallets.contains_key(&user_id) {
            return Err(RepositoryError::NotFound(format!(
                "wallet for user {}",
                user_id
            )));
        }
        scope.staged_balance = Some((user_id, balance));
        Ok(())
    }

    async fn aggregate_balance(&self, user_id: Uuid) -> Result<i64, RepositoryError> {
        let state = self.state.lock().await;
        let amount = state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| {
                t.tx_type()
                    .map(|ty| ty.signed(t.amount))
                    .unwrap_or_default()
            })
            .sum();
        Ok(amount)
    }

    async fn list_transactions(
        &self,
        filter: Option<TransactionType>,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let state = self.state.lock().await;
        let transactions = state
            .transactions
            .iter()
            .rev()
            .filter(|t| match filter {
                Some(ty) => t.transaction_type == ty.as_str(),
                None => true,
            })
            .cloned()
            .collect();
        Ok(transactions)
    }
}

/// In-memory user store with failure injection for saga tests
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
    fail_delete: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `delete` call fail, leaving the row in place
    pub fn fail_next_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl super::UserStore for MemoryUserStore {
    async fn insert(&self, attrs: &NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == attrs.email) {
            return Err(RepositoryError::Duplicate(format!(
                "email {}",
                attrs.email
            )));
        }

        let user = User::from_attributes(attrs);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.lock().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }

    async fn update(&self, id: Uuid, attrs: &NewUser) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        user.email = attrs.email.clone();
        user.first_name = attrs.first_name.clone();
        user.last_name = attrs.last_name.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        if self.fail_delete.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "user store rejected delete".to_string(),
            ));
        }

        let mut users = self.users.lock().await;
        users
            .remove(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        Ok(())
    }
}
