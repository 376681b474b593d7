//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod coach;
pub mod moderation;
pub mod users;

// Re-exports per facilitare l'import
pub use coach::{flag_message, get_history, stream_chat};
pub use moderation::{get_moderation_item, list_moderation_items, update_moderation_item};
pub use users::{list_users, lock_user, warn_user};

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}
