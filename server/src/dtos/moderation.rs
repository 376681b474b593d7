//! Moderation DTOs - Data Transfer Objects per la revisione degli elementi segnalati

use super::PaginationDTO;
use crate::entities::{ModerationItem, ModerationKind, ModerationStatus};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Identificativi accettati per gli elementi di moderazione
    pub static ref ITEM_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap();
}

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModerationItemDTO {
    pub id: String,
    pub kind: ModerationKind,
    pub status: ModerationStatus,
    pub subject: String,
    pub target_user_id: Option<i32>,
    pub message_id: Option<i32>,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ModerationItem> for ModerationItemDTO {
    fn from(value: ModerationItem) -> Self {
        Self {
            id: value.item_id,
            kind: value.kind,
            status: value.status,
            subject: value.subject,
            target_user_id: value.target_user_id,
            message_id: value.message_id,
            admin_notes: value.admin_notes,
            reviewed_by: value.reviewed_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Body di `PATCH /api/admin/moderation`
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModerationDTO {
    #[validate(regex(path = *ITEM_ID_RE, message = "Invalid item id"))]
    pub item_id: String,

    pub status: ModerationStatus,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Admin notes must be at most 2000 characters"))]
    pub admin_notes: Option<String>,
}

/// Risposta di `PATCH /api/admin/moderation`
#[derive(Serialize, Deserialize, Debug)]
pub struct ModerationUpdateResponseDTO {
    pub success: bool,
    pub item: ModerationItemDTO,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ModerationListResponseDTO {
    pub items: Vec<ModerationItemDTO>,
    pub pagination: PaginationDTO,
}

/// DTO per creare un nuovo elemento da moderare (sempre in stato PENDING)
#[derive(Debug, Clone)]
pub struct CreateModerationItemDTO {
    pub item_id: String,
    pub kind: ModerationKind,
    pub subject: String,
    pub target_user_id: Option<i32>,
    pub message_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// DTO per registrare la decisione di un amministratore
///
/// `expected_status` è lo stato letto prima della validazione della transizione:
/// l'update fallisce se nel frattempo è cambiato.
#[derive(Debug, Clone)]
pub struct ReviewModerationDTO {
    pub expected_status: ModerationStatus,
    pub status: ModerationStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: i32,
    pub reviewed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_accepts_simple_ids() {
        assert!(ITEM_ID_RE.is_match("x1"));
        assert!(ITEM_ID_RE.is_match("flag_12-ab"));
    }

    #[test]
    fn item_id_rejects_paths_and_blanks() {
        assert!(!ITEM_ID_RE.is_match(""));
        assert!(!ITEM_ID_RE.is_match("../etc"));
        assert!(!ITEM_ID_RE.is_match("x 1"));
    }

    #[test]
    fn update_body_uses_camel_case() {
        let body: UpdateModerationDTO = serde_json::from_str(
            r#"{"itemId":"x1","status":"REJECTED","adminNotes":"spam"}"#,
        )
        .unwrap();
        assert_eq!(body.item_id, "x1");
        assert_eq!(body.status, ModerationStatus::Rejected);
        assert_eq!(body.admin_notes.as_deref(), Some("spam"));
        assert!(body.validate().is_ok());
    }
}
