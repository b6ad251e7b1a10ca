use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User identity record, owned by the user store
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: NaiveDateTime,
}

/// Attributes required to create a user (typically from API input)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// Build a User from creation attributes, assigning id and timestamp
    pub fn from_attributes(attrs: &NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: attrs.email.clone(),
            first_name: attrs.first_name.clone(),
            last_name: attrs.last_name.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
