//! Provisioning coordinator: creates a user and its wallet as one logical
//! unit across two separately owned stores.
//!
//! The two rows cannot share a transaction boundary, so creation runs as a
//! two-step saga: insert the user, then create the wallet, and on wallet
//! failure compensate by deleting the user row just created. The
//! coordinator makes at most one attempt per step; retry policy belongs to
//! the caller.

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::repositories::{LedgerStore, UserStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Service for user lifecycle, including wallet provisioning
pub struct UserService<U, L> {
    users: Arc<U>,
    ledger: Arc<L>,
}

impl<U: UserStore, L: LedgerStore> UserService<U, L> {
    pub fn new(users: Arc<U>, ledger: Arc<L>) -> Self {
        Self { users, ledger }
    }

    /// Create a user and its wallet. On success exactly one wallet with
    /// balance 0 exists for the new user; on failure no partial state
    /// remains, unless the compensating delete itself fails, which
    /// surfaces as the distinct unrecoverable error.
    pub async fn create_user_with_wallet(&self, attrs: NewUser) -> AppResult<User> {
        if attrs.email.trim().is_empty() {
            return Err(AppError::Validation("email must not be empty".to_string()));
        }

        // Step 1: user row. Nothing to compensate if this fails.
        let user = self.users.insert(&attrs).await.map_err(AppError::from)?;
        info!(user_id = %user.id, "user created, provisioning wallet");

        // Step 2: wallet row in the other ownership domain.
        match self.ledger.create_wallet(user.id).await {
            Ok(_) => {
                info!(user_id = %user.id, "wallet provisioned");
                Ok(user)
            }
            Err(wallet_err) => {
                warn!(
                    user_id = %user.id,
                    error = %wallet_err,
                    "wallet creation failed, compensating with user delete"
                );
                match self.users.delete(user.id).await {
                    Ok(()) => Err(AppError::Provisioning {
                        user_id: user.id,
                        source: wallet_err,
                    }),
                    Err(delete_err) => {
                        error!(
                            user_id = %user.id,
                            wallet_error = %wallet_err,
                            delete_error = %delete_err,
                            "compensating delete failed, user row is orphaned"
                        );
                        Err(AppError::UnrecoverableProvisioning {
                            user_id: user.id,
                            wallet_error: wallet_err.to_string(),
                            source: delete_err,
                        })
                    }
                }
            }
        }
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await.map_err(AppError::from)
    }

    pub async fn update_user(&self, id: Uuid, attrs: NewUser) -> AppResult<()> {
        self.users
            .update(id, &attrs)
            .await
            .map_err(AppError::from)
    }

    /// Delete a user and, transitively, its wallet. The user row is
    /// authoritative; a failed wallet cleanup leaves no balance exposure
    /// and is logged for operator follow-up.
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.users.delete(id).await.map_err(AppError::from)?;

        if let Err(err) = self.ledger.delete_wallet(id).await {
            warn!(user_id = %id, error = %err, "wallet cleanup failed after user delete");
        }

        Ok(())
    }
}
