//! Users services - Gestione amministrativa degli account

use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateModerationItemDTO, LockUserDTO, ModerationItemDTO, PaginationDTO, UpdateUserDTO,
    UserDTO, UserListQuery, UserListResponseDTO, UserStatsDTO, WarnUserDTO,
};
use crate::entities::{AccountStatus, ModerationKind, User};
use crate::repositories::{Create, Read, Update, UserFilter};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserListQuery>, // ?page=1&limit=20&tier=pro&status=all&search=ann&sortBy=name&sortOrder=asc
) -> Result<Json<UserListResponseDTO>, AppError> {
    debug!("Listing users");
    // 1. Validare paginazione e ricerca
    // 2. Convertire i filtri `all` in assenza di filtro
    // 3. Recuperare la pagina filtrata con il conteggio totale filtrato
    // 4. Recuperare le statistiche globali (non filtrate)
    // 5. Ritornare { users, pagination, stats }
    params.validate()?;

    let filter = UserFilter {
        search: params.search_term().map(str::to_string),
        tier: params.tier.as_tier(),
        status: params.status.as_status(),
        sort_by: params.sort_by,
        sort_order: params.sort_order,
        page: params.page,
        limit: params.limit,
    };

    let (users, total) = state.user.find_page(&filter).await?;
    let stats = state.user.stats().await?;

    info!("Found {} users matching filters", total);
    Ok(Json(UserListResponseDTO {
        users: users.into_iter().map(UserDTO::from).collect(),
        pagination: PaginationDTO::new(params.page, params.limit, total),
        stats: UserStatsDTO::from(stats),
    }))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id, user_id = %user_id))]
pub async fn warn_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Extension(admin): Extension<User>,
    Json(body): Json<WarnUserDTO>,
) -> Result<(StatusCode, Json<ModerationItemDTO>), AppError> {
    // 1. Validare il motivo
    // 2. Incrementare il contatore di ammonimenti (NOT_FOUND se l'utente non esiste)
    // 3. Registrare l'ammonimento come elemento USER_WARNING in attesa di revisione
    body.validate()?;

    let target = state.user.increment_warnings(&user_id).await?;

    let item = state
        .moderation
        .create(&CreateModerationItemDTO {
            item_id: format!("warn-{}", Uuid::new_v4().simple()),
            kind: ModerationKind::UserWarning,
            subject: format!("{} ({}): {}", target.name, target.email, body.reason.trim()),
            target_user_id: Some(target.user_id),
            message_id: None,
            created_at: Utc::now(),
        })
        .await?;

    info!(
        "User warned, now at {} warnings (item {})",
        target.warnings_count, item.item_id
    );
    Ok((StatusCode::CREATED, Json(ModerationItemDTO::from(item))))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id, user_id = %user_id, locked = body.locked))]
pub async fn lock_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Extension(admin): Extension<User>,
    Json(body): Json<LockUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    // 1. Un amministratore non può bloccare il proprio account
    // 2. Verificare che l'utente esista
    // 3. Impostare lo stato LOCKED oppure ripristinare ACTIVE
    if admin.user_id == user_id && body.locked {
        warn!("Admin tried to lock their own account");
        return Err(AppError::bad_request("You cannot lock your own account"));
    }

    if state.user.read(&user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let status = if body.locked {
        AccountStatus::Locked
    } else {
        AccountStatus::Active
    };
    let updated = state
        .user
        .update(&user_id, &UpdateUserDTO { status: Some(status) })
        .await?;

    info!("User status set to {:?}", updated.status);
    Ok(Json(UserDTO::from(updated)))
}
