//! DTO - Forme verificate delle risposte del server
//!
//! Ogni risposta viene deserializzata qui, al confine; il resto del client
//! lavora solo su questi tipi.

use crate::chat::Role;
use crate::moderation::{ModerationItem, ModerationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload di un frame `data:` dello stream di chat
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StreamFrame {
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Body di `POST /api/coach/chat`
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<HistoryEntry>,
}

/// Messaggio salvato dal server nella cronologia dell'utente
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ReasonBody<'a> {
    pub reason: &'a str,
}

#[derive(Serialize, Debug, Clone)]
pub struct LockBody {
    pub locked: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Elite,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Suspended,
    Locked,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
}

/// Riga della tabella utenti della dashboard admin
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub tier: SubscriptionTier,
    pub status: UserStatus,
    pub role: UserRole,
    pub warnings_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub suspended_users: i64,
    pub locked_users: i64,
    pub pro_users: i64,
    pub elite_users: i64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UserListResponse {
    pub users: Vec<UserRow>,
    pub pagination: Pagination,
    pub stats: UserStats,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModerationListResponse {
    pub items: Vec<ModerationItem>,
    pub pagination: Pagination,
}

/// Body di `PATCH /api/admin/moderation`
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModerationUpdate {
    pub item_id: String,
    pub status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModerationUpdateResponse {
    pub success: bool,
    #[serde(default)]
    pub item: Option<ModerationItem>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Corpo delle risposte di errore: `{ success: false, error, details? }`
#[derive(Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_uses_camel_case() {
        let request = ChatRequest {
            message: "Hello".into(),
            conversation_history: vec![HistoryEntry {
                role: Role::Assistant,
                content: "Hi".into(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "Hello",
                "conversationHistory": [{ "role": "assistant", "content": "Hi" }]
            })
        );
    }

    #[test]
    fn user_row_rejects_unknown_tier() {
        let row = json!({
            "id": 1, "name": "Anna", "email": "anna@example.com", "tier": "PLATINUM",
            "status": "ACTIVE", "role": "USER", "warningsCount": 0,
            "createdAt": "2025-03-01T10:00:00Z"
        });
        assert!(serde_json::from_value::<UserRow>(row).is_err());
    }

    #[test]
    fn moderation_update_omits_missing_notes() {
        let update = ModerationUpdate {
            item_id: "x1".into(),
            status: ModerationStatus::Approved,
            admin_notes: None,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "itemId": "x1", "status": "APPROVED" })
        );
    }
}
