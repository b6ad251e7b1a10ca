//! Domain models for the ledger backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the wallet and ledger service.

pub mod transaction;
pub mod user;
pub mod wallet;

// Re-export all models for convenient access
pub use transaction::{NewTransaction, Transaction, TransactionType};
pub use user::{NewUser, User};
pub use wallet::{Balance, Wallet};
