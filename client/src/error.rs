//! Errori del client - Tassonomia unica per trasporto, stato HTTP e regole locali

use crate::moderation::ModerationStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// La richiesta non è stata completata (connessione, timeout, stream interrotto)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Il server ha risposto con uno stato non 2xx
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    /// Il server ha risposto 2xx ma con `success: false`
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("message is empty")]
    EmptyMessage,

    #[error("a reply is already streaming")]
    Busy,

    /// La riga ha già un aggiornamento in volo
    #[error("an update for item {0} is already in progress")]
    ItemPending(String),

    #[error("cannot move item from {from:?} to {to:?}")]
    InvalidTransition {
        from: ModerationStatus,
        to: ModerationStatus,
    },

    #[error("unknown moderation item {0}")]
    UnknownItem(String),

    /// La richiesta è stata superata da una più recente
    #[error("request superseded by a newer one")]
    Aborted,
}

impl ClientError {
    /// Messaggio mostrato all'utente nello stato di errore del componente
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Rejected(message) => message.clone(),
            ClientError::Transport(_) => "Network error, please try again".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
