//! CoachMessage entity - Messaggio della conversazione con il coach AI

use super::enums::MessageRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct CoachMessage {
    pub message_id: i32,
    pub user_id: i32,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
