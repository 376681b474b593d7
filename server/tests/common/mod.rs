#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{Duration, Utc};
use coach_server::coach::ScriptedCoach;
use coach_server::core::{AppState, MIGRATOR, encode_jwt};
use coach_server::dtos::{CreateModerationItemDTO, CreateUserDTO};
use coach_server::entities::{
    AccountStatus, ModerationKind, SubscriptionTier, User, UserRole,
};
use coach_server::repositories::Create;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

pub const JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Utenti caricati in ogni test, nell'ordine di inserimento (user_id 1..=6)
pub const SEED_USERS: &[(&str, &str, SubscriptionTier, AccountStatus, UserRole)] = &[
    ("Ada Admin", "ada@coach.io", SubscriptionTier::Elite, AccountStatus::Active, UserRole::Admin),
    ("Anna Berg", "anna.berg@mail.com", SubscriptionTier::Pro, AccountStatus::Active, UserRole::User),
    ("Joanne Kim", "jo@kim.dev", SubscriptionTier::Free, AccountStatus::Active, UserRole::User),
    ("Marco Rossi", "marco@hannover.de", SubscriptionTier::Elite, AccountStatus::Suspended, UserRole::User),
    ("Luca Bianchi", "luca@mail.com", SubscriptionTier::Free, AccountStatus::Locked, UserRole::User),
    ("Sara Lee", "sara@mail.com", SubscriptionTier::Pro, AccountStatus::Active, UserRole::User),
];

pub const ADMIN_ID: i32 = 1;
pub const ANNA_ID: i32 = 2;
pub const LOCKED_ID: i32 = 5;
pub const SARA_ID: i32 = 6;

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub users: Vec<User>,
}

impl TestApp {
    pub fn token_for(&self, user_id: i32) -> String {
        let user = self
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .expect("seeded user");
        encode_jwt(user.user_id, &user.name, user.role, JWT_SECRET).expect("token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(ADMIN_ID)
    }
}

/// Database in memoria con le migrations applicate.
///
/// Una sola connessione senza scadenza: ogni connessione `:memory:` è un database diverso.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

/// Crea un AppState per i test, con il coach senza pause tra i frammenti
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    let coach = Arc::new(ScriptedCoach::new(std::time::Duration::ZERO));
    Arc::new(AppState::new(pool, JWT_SECRET.to_string(), coach))
}

pub async fn seed_users(state: &AppState) -> Vec<User> {
    let base = Utc::now() - Duration::days(30);
    let mut users = Vec::new();
    for (i, (name, email, tier, status, role)) in SEED_USERS.iter().enumerate() {
        let user = state
            .user
            .create(&CreateUserDTO {
                name: name.to_string(),
                email: email.to_string(),
                tier: *tier,
                status: *status,
                role: *role,
                created_at: base + Duration::days(i as i64),
            })
            .await
            .expect("Failed to seed user");
        users.push(user);
    }
    users
}

pub async fn seed_moderation_item(state: &AppState, item_id: &str, kind: ModerationKind) {
    state
        .moderation
        .create(&CreateModerationItemDTO {
            item_id: item_id.to_string(),
            kind,
            subject: format!("Review {item_id}"),
            target_user_id: Some(ANNA_ID),
            message_id: None,
            created_at: Utc::now(),
        })
        .await
        .expect("Failed to seed moderation item");
}

/// Server di test con utenti e due elementi di moderazione (`x1`, `x2`) già caricati
pub async fn spawn_app() -> TestApp {
    let pool = create_test_pool().await;
    let state = create_test_state(pool);
    let users = seed_users(&state).await;
    seed_moderation_item(&state, "x1", ModerationKind::FlaggedMessage).await;
    seed_moderation_item(&state, "x2", ModerationKind::VideoSuggestion).await;

    let app = coach_server::create_router(state.clone());
    let server = TestServer::new(app).expect("Failed to create test server");
    TestApp {
        server,
        state,
        users,
    }
}
