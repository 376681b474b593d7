//! Coach module - Generazione e relay delle risposte del coach AI

pub mod engine;
pub mod streams;

pub use engine::{CoachEngine, ScriptedCoach};
pub use streams::{ActiveStreams, StreamSlot};

/// Numero massimo di messaggi di cronologia considerati per una risposta
pub const HISTORY_LIMIT: usize = 10;
