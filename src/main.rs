//! Ledger Backend Service
//!
//! Main entry point for the wallet/ledger backend. Wires configuration,
//! the two database pools (user store and wallet/ledger store), runs
//! migrations for each ownership domain, and holds the service state until
//! shutdown. Transport adapters (gRPC/HTTP) attach to `AppState` and are
//! deployed separately.

mod config;
mod database;
mod error;
mod models;
mod repositories;
mod services;

use config::AppConfig;
use database::{create_pool, run_migrations};
use error::{AppError, AppResult};
use repositories::{PgLedgerStore, PgUserStore};
use services::{BalanceAuditor, UserService, WalletService};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ledger_backend={},sqlx=warn", config.log_level).into()
            }),
        )
        .init();

    info!("Ledger backend starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);

    // Each ownership domain gets its own pool and migration history
    info!("Connecting to user store...");
    let user_pool = create_pool(&config.user_database).await.map_err(|e| {
        error!("Failed to create user store pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Connecting to wallet/ledger store...");
    let wallet_pool = create_pool(&config.wallet_database).await.map_err(|e| {
        error!("Failed to create wallet store pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Running migrations...");
    run_migrations(&user_pool, "./migrations/user")
        .await
        .map_err(|e| {
            error!("User store migration failed: {}", e);
            AppError::Database(e)
        })?;
    run_migrations(&wallet_pool, "./migrations/wallet")
        .await
        .map_err(|e| {
            error!("Wallet store migration failed: {}", e);
            AppError::Database(e)
        })?;
    info!("Migrations completed");

    // Wire the services
    let user_store = Arc::new(PgUserStore::new(user_pool));
    let ledger_store = Arc::new(PgLedgerStore::new(wallet_pool));

    let _user_service = Arc::new(UserService::new(user_store, Arc::clone(&ledger_store)));
    let _wallet_service = Arc::new(WalletService::new(Arc::clone(&ledger_store)));
    let _auditor = Arc::new(BalanceAuditor::new(ledger_store));

    info!("Services initialized, ready for transport adapters");

    // Run until shutdown is requested
    tokio::signal::ctrl_c().await.map_err(|e| {
        error!("Failed to listen for shutdown signal: {}", e);
        AppError::Config(e.to_string())
    })?;

    info!("Shutdown signal received, exiting");

    Ok(())
}
