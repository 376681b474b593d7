//! User DTOs - Data Transfer Objects per utenti

use super::PaginationDTO;
use crate::entities::{AccountStatus, SubscriptionTier, User, UserRole, UserStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserDTO {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub tier: SubscriptionTier,
    pub status: AccountStatus,
    pub role: UserRole,
    pub warnings_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            name: value.name,
            email: value.email,
            tier: value.tier,
            status: value.status,
            role: value.role,
            warnings_count: value.warnings_count,
            created_at: value.created_at,
        }
    }
}

/// Risposta di `GET /api/admin/users`
#[derive(Serialize, Deserialize, Debug)]
pub struct UserListResponseDTO {
    pub users: Vec<UserDTO>,
    pub pagination: PaginationDTO,
    pub stats: UserStatsDTO,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsDTO {
    pub total_users: i64,
    pub active_users: i64,
    pub suspended_users: i64,
    pub locked_users: i64,
    pub pro_users: i64,
    pub elite_users: i64,
}

impl From<UserStats> for UserStatsDTO {
    fn from(value: UserStats) -> Self {
        Self {
            total_users: value.total_users,
            active_users: value.active_users,
            suspended_users: value.suspended_users,
            locked_users: value.locked_users,
            pro_users: value.pro_users,
            elite_users: value.elite_users,
        }
    }
}

/// DTO per creare un nuovo utente (senza user_id)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub tier: SubscriptionTier,
    pub status: AccountStatus,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// DTO per aggiornare un utente (solo campi modificabili)
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateUserDTO {
    pub status: Option<AccountStatus>,
}

/// Body di `POST /api/admin/users/{user_id}/warn`
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct WarnUserDTO {
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
}

/// Body di `PATCH /api/admin/users/{user_id}/lock`
#[derive(Serialize, Deserialize, Debug)]
pub struct LockUserDTO {
    pub locked: bool,
}
