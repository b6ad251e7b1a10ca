//! Shared test harness built on the in-memory stores, so the suite runs
//! without a Postgres instance.

use ledger_backend::models::{NewUser, User};
use ledger_backend::repositories::{MemoryLedgerStore, MemoryUserStore};
use ledger_backend::services::{BalanceAuditor, UserService, WalletService};
use std::sync::Arc;

pub struct TestHarness {
    pub user_store: Arc<MemoryUserStore>,
    pub ledger_store: Arc<MemoryLedgerStore>,
    pub user_service: UserService<MemoryUserStore, MemoryLedgerStore>,
    pub wallet_service: Arc<WalletService<MemoryLedgerStore>>,
    pub auditor: BalanceAuditor<MemoryLedgerStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        let user_store = Arc::new(MemoryUserStore::new());
        let ledger_store = Arc::new(MemoryLedgerStore::new());

        Self {
            user_service: UserService::new(Arc::clone(&user_store), Arc::clone(&ledger_store)),
            wallet_service: Arc::new(WalletService::new(Arc::clone(&ledger_store))),
            auditor: BalanceAuditor::new(Arc::clone(&ledger_store)),
            user_store,
            ledger_store,
        }
    }

    /// Provision a user with a wallet, panicking on failure
    pub async fn provision_user(&self, email: &str) -> User {
        self.user_service
            .create_user_with_wallet(new_user(email))
            .await
            .expect("provisioning should succeed")
    }
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}
