pub mod ledger_store;
pub mod memory;
pub mod user_store;

// Re-export all stores for convenient access
pub use ledger_store::{LedgerStore, PgLedgerStore};
pub use memory::{MemoryLedgerStore, MemoryUserStore};
pub use user_store::{PgUserStore, UserStore};
