//! Chat DTOs - Data Transfer Objects per la conversazione con il coach

use crate::entities::{CoachMessage, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Singolo messaggio della cronologia inviata dal client insieme alla domanda
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntryDTO {
    pub role: MessageRole,
    pub content: String,
}

/// Body di `POST /api/coach/chat`
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestDTO {
    #[validate(length(min = 1, max = 4000, message = "Message must be between 1 and 4000 characters"))]
    pub message: String,

    #[serde(default)]
    pub conversation_history: Vec<HistoryEntryDTO>,
}

/// Payload JSON di un frame `data:` dello stream di risposta
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StreamFrameDTO {
    pub content: String,
}

/// Messaggio persistito restituito da `GET /api/coach/history`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CoachMessageDTO {
    pub id: i32,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<CoachMessage> for CoachMessageDTO {
    fn from(value: CoachMessage) -> Self {
        Self {
            id: value.message_id,
            role: value.role,
            content: value.content,
            timestamp: value.created_at,
        }
    }
}

/// DTO per salvare un nuovo messaggio (senza message_id)
#[derive(Debug, Clone)]
pub struct CreateCoachMessageDTO {
    pub user_id: i32,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Body di `POST /api/coach/messages/{message_id}/flag`
#[derive(Deserialize, Debug, Validate)]
pub struct FlagMessageDTO {
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
}
