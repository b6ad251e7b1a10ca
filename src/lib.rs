//! Ledger Backend Library
//!
//! This module exposes the wallet/ledger components for use by tests and
//! other consumers.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repositories::{PgLedgerStore, PgUserStore};
use services::{BalanceAuditor, UserService, WalletService};
use std::sync::Arc;

/// Application state containing the wired services over Postgres stores
pub struct AppState {
    pub user_service: Arc<UserService<PgUserStore, PgLedgerStore>>,
    pub wallet_service: Arc<WalletService<PgLedgerStore>>,
    pub auditor: Arc<BalanceAuditor<PgLedgerStore>>,
}

impl AppState {
    /// Create a new AppState from the two ownership domains' pools
    pub fn new(user_pool: sqlx::PgPool, wallet_pool: sqlx::PgPool) -> Self {
        let user_store = Arc::new(PgUserStore::new(user_pool));
        let ledger_store = Arc::new(PgLedgerStore::new(wallet_pool));

        Self {
            user_service: Arc::new(UserService::new(user_store, Arc::clone(&ledger_store))),
            wallet_service: Arc::new(WalletService::new(Arc::clone(&ledger_store))),
            auditor: Arc::new(BalanceAuditor::new(ledger_store)),
        }
    }
}
