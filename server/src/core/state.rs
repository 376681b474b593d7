//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::coach::{ActiveStreams, CoachEngine};
use crate::repositories::{CoachMessageRepository, ModerationRepository, UserRepository};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per i messaggi della conversazione con il coach
    pub coach_msg: CoachMessageRepository,

    /// Repository per gli elementi da moderare
    pub moderation: ModerationRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Motore che genera le risposte del coach
    pub coach: Arc<dyn CoachEngine>,

    /// Utenti con uno stream di risposta in corso
    pub streams: ActiveStreams,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito.
    ///
    /// # Arguments
    /// * `pool` - Pool di connessioni SQLite condiviso
    /// * `jwt_secret` - Chiave segreta per la verifica dei token JWT
    /// * `coach` - Motore delle risposte del coach
    pub fn new(pool: SqlitePool, jwt_secret: String, coach: Arc<dyn CoachEngine>) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            coach_msg: CoachMessageRepository::new(pool.clone()),
            moderation: ModerationRepository::new(pool),
            jwt_secret,
            coach,
            streams: ActiveStreams::new(),
        }
    }
}
