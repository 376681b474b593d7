//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod coach_message;
pub mod enums;
pub mod moderation_item;
pub mod user;

// Re-exports per facilitare l'import
pub use coach_message::CoachMessage;
pub use enums::{AccountStatus, MessageRole, ModerationKind, ModerationStatus, SubscriptionTier, UserRole};
pub use moderation_item::ModerationItem;
pub use user::{User, UserStats};
