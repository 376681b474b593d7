//! Query DTOs - Data Transfer Objects per query di ricerca e paginazione

use crate::entities::{AccountStatus, ModerationKind, ModerationStatus, SubscriptionTier};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TierFilter {
    #[default]
    All,
    Free,
    Pro,
    Elite,
}

impl TierFilter {
    pub fn as_tier(self) -> Option<SubscriptionTier> {
        match self {
            TierFilter::All => None,
            TierFilter::Free => Some(SubscriptionTier::Free),
            TierFilter::Pro => Some(SubscriptionTier::Pro),
            TierFilter::Elite => Some(SubscriptionTier::Elite),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Suspended,
    Locked,
}

impl StatusFilter {
    pub fn as_status(self) -> Option<AccountStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some(AccountStatus::Active),
            StatusFilter::Suspended => Some(AccountStatus::Suspended),
            StatusFilter::Locked => Some(AccountStatus::Locked),
        }
    }
}

/// Colonne ordinabili della lista utenti (whitelist, mai interpolare input del client)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum UserSortKey {
    #[default]
    CreatedAt,
    Name,
    Email,
    Tier,
    Status,
}

impl UserSortKey {
    pub fn column(self) -> &'static str {
        match self {
            UserSortKey::CreatedAt => "created_at",
            UserSortKey::Name => "name",
            UserSortKey::Email => "email",
            UserSortKey::Tier => "tier",
            UserSortKey::Status => "status",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters di `GET /api/admin/users`
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = 1_000_000, message = "Page must be between 1 and 1000000"))]
    pub page: i64,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: i64,

    #[serde(default)]
    pub tier: TierFilter,

    #[serde(default)]
    pub status: StatusFilter,

    #[serde(default)]
    #[validate(length(max = 100, message = "Search must be at most 100 characters"))]
    pub search: Option<String>,

    #[serde(default)]
    pub sort_by: UserSortKey,

    #[serde(default)]
    pub sort_order: SortOrder,
}

impl UserListQuery {
    /// Testo di ricerca normalizzato: `None` se assente o vuoto dopo il trim
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationStatusFilter {
    #[default]
    #[serde(alias = "all")]
    All,
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ModerationStatusFilter {
    pub fn as_status(self) -> Option<ModerationStatus> {
        match self {
            ModerationStatusFilter::All => None,
            ModerationStatusFilter::Pending => Some(ModerationStatus::Pending),
            ModerationStatusFilter::UnderReview => Some(ModerationStatus::UnderReview),
            ModerationStatusFilter::Approved => Some(ModerationStatus::Approved),
            ModerationStatusFilter::Rejected => Some(ModerationStatus::Rejected),
        }
    }
}

/// Query parameters di `GET /api/admin/moderation`
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModerationListQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = 1_000_000, message = "Page must be between 1 and 1000000"))]
    pub page: i64,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: i64,

    #[serde(default)]
    pub status: ModerationStatusFilter,

    #[serde(default)]
    pub kind: Option<ModerationKind>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Search must be at most 100 characters"))]
    pub search: Option<String>,
}

impl ModerationListQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Query parameters di `GET /api/coach/history`
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct HistoryQuery {
    #[serde(default)]
    #[validate(range(min = 1, max = 200, message = "Limit must be between 1 and 200"))]
    pub limit: Option<i64>,
}
