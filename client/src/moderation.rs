//! Moderazione - Macchina a stati delle azioni dell'amministratore
//!
//! Ogni riga ha il suo flag di richiesta in corso e il suo errore inline.
//! Una richiesta fallita non tocca lo stato né le note della riga.

use crate::dto::ModerationUpdate;
use crate::error::{ClientError, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// `PENDING -> {UNDER_REVIEW, APPROVED, REJECTED}`, `UNDER_REVIEW -> {APPROVED, REJECTED}`.
/// `APPROVED` e `REJECTED` sono terminali.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn allowed_transitions(self) -> &'static [ModerationStatus] {
        use ModerationStatus::*;
        match self {
            Pending => &[UnderReview, Approved, Rejected],
            UnderReview => &[Approved, Rejected],
            Approved | Rejected => &[],
        }
    }

    pub fn can_transition_to(self, target: ModerationStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            ModerationStatus::Pending => "PENDING",
            ModerationStatus::UnderReview => "UNDER_REVIEW",
            ModerationStatus::Approved => "APPROVED",
            ModerationStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationKind {
    FlaggedMessage,
    VideoSuggestion,
    UserWarning,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModerationItem {
    pub id: String,
    pub kind: ModerationKind,
    pub status: ModerationStatus,
    pub subject: String,
    #[serde(default)]
    pub target_user_id: Option<i64>,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Endpoint che applica una decisione di moderazione
pub trait ModerationApi {
    async fn update(&self, update: &ModerationUpdate) -> Result<ModerationItem>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModerationRow {
    pub item: ModerationItem,
    pub pending: bool,
    pub error: Option<String>,
}

/// Richiesta avviata da [`ModerationBoard::begin`], da chiudere con [`ModerationBoard::complete`]
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    update: ModerationUpdate,
}

impl PendingUpdate {
    pub fn item_id(&self) -> &str {
        &self.update.item_id
    }

    pub fn request(&self) -> &ModerationUpdate {
        &self.update
    }
}

/// Tabella degli elementi da moderare con le azioni in corso
pub struct ModerationBoard<A> {
    api: A,
    rows: Vec<ModerationRow>,
}

impl<A: ModerationApi> ModerationBoard<A> {
    pub fn new(api: A, items: Vec<ModerationItem>) -> Self {
        let mut board = Self {
            api,
            rows: Vec::new(),
        };
        board.replace_items(items);
        board
    }

    /// Sostituisce le righe con una nuova pagina dal server
    pub fn replace_items(&mut self, items: Vec<ModerationItem>) {
        self.rows = items
            .into_iter()
            .map(|item| ModerationRow {
                item,
                pending: false,
                error: None,
            })
            .collect();
    }

    pub fn rows(&self) -> &[ModerationRow] {
        &self.rows
    }

    pub fn row(&self, item_id: &str) -> Option<&ModerationRow> {
        self.rows.iter().find(|r| r.item.id == item_id)
    }

    fn row_mut(&mut self, item_id: &str) -> Option<&mut ModerationRow> {
        self.rows.iter_mut().find(|r| r.item.id == item_id)
    }

    /// Azioni che la UI offre per la riga: nessuna per gli stati terminali
    /// o mentre una richiesta è in corso.
    pub fn offered_actions(&self, item_id: &str) -> &'static [ModerationStatus] {
        match self.row(item_id) {
            Some(row) if !row.pending => row.item.status.allowed_transitions(),
            _ => &[],
        }
    }

    /// Valida la transizione e segna la riga come in attesa.
    ///
    /// Riemettere lo stato corrente è ammesso: il server sovrascrive solo note e timestamp.
    pub fn begin(
        &mut self,
        item_id: &str,
        target: ModerationStatus,
        notes: Option<String>,
    ) -> Result<PendingUpdate> {
        let row = self
            .row_mut(item_id)
            .ok_or_else(|| ClientError::UnknownItem(item_id.to_string()))?;

        if row.pending {
            return Err(ClientError::ItemPending(item_id.to_string()));
        }
        let current = row.item.status;
        if current != target && !current.can_transition_to(target) {
            return Err(ClientError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        row.pending = true;
        row.error = None;
        Ok(PendingUpdate {
            update: ModerationUpdate {
                item_id: item_id.to_string(),
                status: target,
                admin_notes: notes,
            },
        })
    }

    /// Chiude una richiesta: in caso di successo la riga prende l'elemento del server,
    /// altrimenti resta com'era e riceve l'errore inline.
    pub fn complete(
        &mut self,
        pending: PendingUpdate,
        result: Result<ModerationItem>,
    ) -> Result<()> {
        let Some(row) = self.row_mut(pending.item_id()) else {
            debug!("Row {} left the board before completion", pending.item_id());
            return result.map(|_| ());
        };
        row.pending = false;

        match result {
            Ok(item) => {
                row.item = item;
                Ok(())
            }
            Err(e) => {
                warn!("Moderation update for {} failed: {}", pending.item_id(), e);
                row.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    #[instrument(skip(self, notes))]
    pub async fn apply(
        &mut self,
        item_id: &str,
        target: ModerationStatus,
        notes: Option<String>,
    ) -> Result<()> {
        let pending = self.begin(item_id, target, notes)?;
        let result = self.api.update(pending.request()).await;
        self.complete(pending, result)
    }

    /// Avvia tutte le richieste, le esegue in parallelo e chiude ciascuna indipendentemente.
    /// Il risultato i-esimo corrisponde all'aggiornamento i-esimo.
    pub async fn apply_many(&mut self, updates: Vec<ModerationUpdate>) -> Vec<Result<()>> {
        let mut results: Vec<Option<Result<()>>> = Vec::with_capacity(updates.len());
        let mut started = Vec::new();

        for (idx, update) in updates.into_iter().enumerate() {
            match self.begin(&update.item_id, update.status, update.admin_notes) {
                Ok(pending) => {
                    results.push(None);
                    started.push((idx, pending));
                }
                Err(e) => results.push(Some(Err(e))),
            }
        }

        let api = &self.api;
        let responses = join_all(started.iter().map(|(_, p)| api.update(p.request()))).await;

        for ((idx, pending), response) in started.into_iter().zip(responses) {
            results[idx] = Some(self.complete(pending, response));
        }

        results
            .into_iter()
            .map(|r| r.unwrap_or(Err(ClientError::Aborted)))
            .collect()
    }
}
