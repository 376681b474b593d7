//! Chat - Scambio in streaming con il coach AI
//!
//! Il pannello invia un messaggio con la cronologia recente e ricostruisce la
//! risposta man mano che arrivano i frammenti. Durante lo streaming la
//! conversazione contiene un solo messaggio segnaposto, sempre in coda, che
//! viene sostituito (mai duplicato) quando la risposta è completa.

use crate::dto::{ChatRequest, HistoryEntry};
use crate::error::{ClientError, Result};
use crate::sse::{Frame, StreamDecoder};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Numero massimo di messaggi di cronologia inviati con una richiesta
pub const HISTORY_LIMIT: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// Id sentinella del messaggio in arrivo
    Streaming,
    Final(Uuid),
}

impl MessageId {
    fn fresh() -> Self {
        MessageId::Final(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_streaming(&self) -> bool {
        self.id == MessageId::Streaming
    }
}

/// Vista ordinata della conversazione, solo in append
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn streaming(&self) -> Option<&ChatMessage> {
        self.messages.last().filter(|m| m.is_streaming())
    }

    /// Ultimi `limit` messaggi definitivi, in ordine cronologico
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let finals: Vec<&ChatMessage> = self.messages.iter().filter(|m| !m.is_streaming()).collect();
        let skip = finals.len().saturating_sub(limit);
        finals
            .into_iter()
            .skip(skip)
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    fn push_final(&mut self, role: Role, content: &str) -> MessageId {
        let id = MessageId::fresh();
        self.messages.push(ChatMessage {
            id,
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
        id
    }

    fn open_placeholder(&mut self) {
        debug_assert!(self.streaming().is_none());
        self.messages.push(ChatMessage {
            id: MessageId::Streaming,
            role: Role::Assistant,
            content: String::new(),
            timestamp: Utc::now(),
        });
    }

    fn replace_placeholder(&mut self, content: &str) {
        if let Some(message) = self.messages.last_mut().filter(|m| m.is_streaming()) {
            message.content.clear();
            message.content.push_str(content);
        }
    }

    fn finalize_placeholder(&mut self) -> Option<MessageId> {
        let message = self.messages.last_mut().filter(|m| m.is_streaming())?;
        message.id = MessageId::fresh();
        message.timestamp = Utc::now();
        Some(message.id)
    }

    fn discard_placeholder(&mut self) -> bool {
        if self.streaming().is_some() {
            self.messages.pop();
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFailure {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    Streaming,
    Failed(ChatFailure),
}

/// Flusso ordinato di byte della risposta
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Apre la richiesta di chat e restituisce il corpo della risposta come stream di byte
pub trait ChatTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream>;
}

/// Pannello di chat: una conversazione e al più uno scambio in corso
pub struct ChatPanel<T> {
    transport: T,
    conversation: Conversation,
    phase: ChatPhase,
    history_limit: usize,
}

impl<T: ChatTransport> ChatPanel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            conversation: Conversation::new(),
            phase: ChatPhase::Idle,
            history_limit: HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn phase(&self) -> &ChatPhase {
        &self.phase
    }

    pub fn can_send(&self) -> bool {
        self.phase != ChatPhase::Streaming
    }

    pub fn dismiss_error(&mut self) {
        if matches!(self.phase, ChatPhase::Failed(_)) {
            self.phase = ChatPhase::Idle;
        }
    }

    /// Rimuove il segnaposto di uno scambio il cui future è stato abbandonato
    pub fn abandon(&mut self) {
        if self.phase == ChatPhase::Streaming {
            self.conversation.discard_placeholder();
            self.phase = ChatPhase::Idle;
            info!("Streaming exchange abandoned");
        }
    }

    /// Invia un messaggio e ricostruisce la risposta in streaming.
    ///
    /// `on_update` riceve la conversazione dopo ogni modifica visibile.
    /// Ritorna l'id definitivo della risposta del coach.
    pub async fn send<F>(&mut self, message: &str, mut on_update: F) -> Result<MessageId>
    where
        F: FnMut(&Conversation),
    {
        let message = message.trim();
        if message.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        if !self.can_send() {
            return Err(ClientError::Busy);
        }

        let request = ChatRequest {
            message: message.to_string(),
            conversation_history: self.conversation.history(self.history_limit),
        };
        self.conversation.push_final(Role::User, message);
        self.conversation.open_placeholder();
        self.phase = ChatPhase::Streaming;
        on_update(&self.conversation);

        match self.exchange(&request, &mut on_update).await {
            Ok(()) => {
                let id = self
                    .conversation
                    .finalize_placeholder()
                    .unwrap_or_else(MessageId::fresh);
                self.phase = ChatPhase::Idle;
                on_update(&self.conversation);
                debug!("Coach reply finalized");
                Ok(id)
            }
            Err(e) => {
                error!("Chat exchange failed: {}", e);
                self.conversation.discard_placeholder();
                self.phase = ChatPhase::Failed(ChatFailure {
                    message: e.user_message(),
                });
                on_update(&self.conversation);
                Err(e)
            }
        }
    }

    async fn exchange<F>(&mut self, request: &ChatRequest, on_update: &mut F) -> Result<()>
    where
        F: FnMut(&Conversation),
    {
        let mut body = self.transport.open(request).await?;
        let mut decoder = StreamDecoder::new();
        let mut reply = String::new();

        while let Some(chunk) = body.next().await {
            let frames = decoder.push(&chunk?);
            apply_frames(&mut self.conversation, frames, &mut reply, on_update);
            if decoder.is_done() {
                return Ok(());
            }
        }

        let frames = decoder.finish();
        apply_frames(&mut self.conversation, frames, &mut reply, on_update);
        Ok(())
    }
}

fn apply_frames<F>(
    conversation: &mut Conversation,
    frames: Vec<Frame>,
    reply: &mut String,
    on_update: &mut F,
) where
    F: FnMut(&Conversation),
{
    for frame in frames {
        match frame {
            Frame::Content(fragment) => {
                reply.push_str(&fragment);
                conversation.replace_placeholder(reply);
                on_update(conversation);
            }
            Frame::Malformed(payload) => warn!("Skipping malformed stream frame: {}", payload),
            Frame::Done => {}
        }
    }
}
