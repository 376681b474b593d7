//! Coach server library - espone i moduli principali per i test

pub mod coach;
pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api/coach", configure_coach_routes(state.clone()))
        .nest("/api/admin", configure_admin_routes(state.clone()))
        .with_state(state)
}

/// Configura le routes della chat con il coach (solo autenticazione)
fn configure_coach_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/chat", post(stream_chat))
        .route("/history", get(get_history))
        .route("/messages/{message_id}/flag", post(flag_message))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes della dashboard admin (autenticazione + ruolo ADMIN)
fn configure_admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{admin_middleware, authentication_middleware};
    use services::*;

    // l'ultimo layer aggiunto è il primo ad essere eseguito: prima autenticazione, poi ruolo
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{user_id}/warn", post(warn_user))
        .route("/users/{user_id}/lock", patch(lock_user))
        .route(
            "/moderation",
            get(list_moderation_items).patch(update_moderation_item),
        )
        .route("/moderation/{item_id}", get(get_moderation_item))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
