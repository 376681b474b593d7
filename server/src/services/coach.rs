//! Coach services - Chat in streaming con il coach AI

use crate::coach::{HISTORY_LIMIT, StreamSlot};
use crate::core::{AppError, AppState};
use crate::dtos::{
    ChatRequestDTO, CoachMessageDTO, CreateCoachMessageDTO, CreateModerationItemDTO,
    FlagMessageDTO, HistoryQuery, ModerationItemDTO, StreamFrameDTO,
};
use crate::entities::{MessageRole, ModerationKind, User};
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::sse::{Event, Sse},
};
use chrono::Utc;
use futures::stream::{BoxStream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Sentinella che chiude lo stream
pub const DONE_SENTINEL: &str = "[DONE]";

const DEFAULT_HISTORY_PAGE: i64 = 50;
const FLAG_EXCERPT_CHARS: usize = 120;

type EventSender = UnboundedSender<Result<Event, Infallible>>;

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn stream_chat(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(mut body): Json<ChatRequestDTO>,
) -> Result<Sse<UnboundedReceiverStream<Result<Event, Infallible>>>, AppError> {
    debug!("Opening coach reply stream");
    // 1. Normalizzare e validare il messaggio (non vuoto dopo il trim)
    // 2. Riservare lo slot di streaming dell'utente, CONFLICT se ne ha già uno aperto
    // 3. Tenere solo gli ultimi HISTORY_LIMIT messaggi di cronologia
    // 4. Salvare il messaggio dell'utente prima di iniziare a rispondere
    // 5. Avviare un task che inoltra i frammenti del coach come frame `data:` e chiude con [DONE]
    body.message = body.message.trim().to_string();
    body.validate()?;

    let slot = state
        .streams
        .try_acquire(current_user.user_id)
        .ok_or_else(|| AppError::conflict("A coach reply is already streaming"))?;

    let history = {
        let all = body.conversation_history;
        let skip = all.len().saturating_sub(HISTORY_LIMIT);
        all.into_iter().skip(skip).collect::<Vec<_>>()
    };

    state
        .coach_msg
        .create(&CreateCoachMessageDTO {
            user_id: current_user.user_id,
            role: MessageRole::User,
            content: body.message.clone(),
            created_at: Utc::now(),
        })
        .await?;

    let fragments = state.coach.reply(&body.message, &history);
    let (tx, rx) = unbounded_channel();
    tokio::spawn(relay_reply(
        state.clone(),
        current_user.user_id,
        fragments,
        tx,
        slot,
    ));

    info!("Coach reply stream opened with {} history messages", history.len());
    Ok(Sse::new(UnboundedReceiverStream::new(rx)))
}

/// Inoltra i frammenti al client e salva la risposta completa.
///
/// Se il client si disconnette a metà la risposta parziale viene scartata.
/// Lo slot dell'utente viene liberato prima del frame finale, così il client
/// che riceve [DONE] può subito inviare un nuovo messaggio.
#[instrument(skip(state, fragments, tx, slot))]
async fn relay_reply(
    state: Arc<AppState>,
    user_id: i32,
    mut fragments: BoxStream<'static, String>,
    tx: EventSender,
    slot: StreamSlot,
) {
    let mut reply = String::new();

    while let Some(fragment) = fragments.next().await {
        let frame = match serde_json::to_string(&StreamFrameDTO {
            content: fragment.clone(),
        }) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode stream frame: {:?}", e);
                continue;
            }
        };
        if tx.send(Ok(Event::default().data(frame))).is_err() {
            warn!("Client disconnected, discarding partial reply");
            return;
        }
        reply.push_str(&fragment);
    }

    let saved = state
        .coach_msg
        .create(&CreateCoachMessageDTO {
            user_id,
            role: MessageRole::Assistant,
            content: reply,
            created_at: Utc::now(),
        })
        .await;
    match saved {
        Ok(message) => info!("Coach reply {} saved", message.message_id),
        Err(e) => error!("Failed to save coach reply: {:?}", e),
    }
    drop(slot);

    if tx.send(Ok(Event::default().data(DONE_SENTINEL))).is_err() {
        debug!("Client gone before [DONE]");
    }
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<CoachMessageDTO>>, AppError> {
    params.validate()?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_PAGE);

    let messages = state
        .coach_msg
        .find_recent_by_user(&current_user.user_id, limit)
        .await?;

    debug!("Retrieved {} coach messages", messages.len());
    Ok(Json(messages.into_iter().map(CoachMessageDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, message_id = %message_id))]
pub async fn flag_message(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<i32>,
    Extension(current_user): Extension<User>,
    Json(body): Json<FlagMessageDTO>,
) -> Result<(StatusCode, Json<ModerationItemDTO>), AppError> {
    // 1. Validare il motivo della segnalazione
    // 2. Verificare che sia una risposta del coach nella conversazione dell'utente
    // 3. Creare un elemento FLAGGED_MESSAGE in stato PENDING
    body.validate()?;

    let message = state
        .coach_msg
        .read(&message_id)
        .await?
        .filter(|m| m.user_id == current_user.user_id && m.role == MessageRole::Assistant)
        .ok_or_else(|| {
            warn!("Message not found in the user's conversation");
            AppError::not_found("Message not found")
        })?;

    let excerpt: String = message.content.chars().take(FLAG_EXCERPT_CHARS).collect();
    let item = state
        .moderation
        .create(&CreateModerationItemDTO {
            item_id: format!("flag-{}", Uuid::new_v4().simple()),
            kind: ModerationKind::FlaggedMessage,
            subject: format!("{}: {}", body.reason.trim(), excerpt),
            target_user_id: Some(current_user.user_id),
            message_id: Some(message.message_id),
            created_at: Utc::now(),
        })
        .await?;

    info!("Message flagged as {}", item.item_id);
    Ok((StatusCode::CREATED, Json(ModerationItemDTO::from(item))))
}
