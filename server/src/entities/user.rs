//! User entity - Entità utente della piattaforma

use super::enums::{AccountStatus, SubscriptionTier, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub tier: SubscriptionTier,
    pub status: AccountStatus,
    pub role: UserRole,
    pub warnings_count: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_locked(&self) -> bool {
        self.status == AccountStatus::Locked
    }
}

/// Contatori aggregati sull'intera base utenti (non filtrati)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub suspended_users: i64,
    pub locked_users: i64,
    pub pro_users: i64,
    pub elite_users: i64,
}
