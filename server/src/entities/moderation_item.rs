//! ModerationItem entity - Elemento revisionabile da un amministratore
//! (messaggio segnalato, video suggerito, ammonimento di un utente)

use super::enums::{ModerationKind, ModerationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ModerationItem {
    pub item_id: String,
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
