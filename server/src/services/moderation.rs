//! Moderation services - Revisione amministrativa degli elementi segnalati

use crate::core::{AppError, AppState};
use crate::dtos::{
    ITEM_ID_RE, ModerationItemDTO, ModerationListQuery, ModerationListResponseDTO,
    ModerationUpdateResponseDTO, PaginationDTO, ReviewModerationDTO, UpdateModerationDTO,
};
use crate::entities::User;
use crate::repositories::{ModerationFilter, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use axum_macros::debug_handler;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state))]
pub async fn list_moderation_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ModerationListQuery>,
) -> Result<Json<ModerationListResponseDTO>, AppError> {
    debug!("Listing moderation items");
    params.validate()?;

    let filter = ModerationFilter {
        status: params.status.as_status(),
        kind: params.kind,
        search: params.search_term().map(str::to_string),
        page: params.page,
        limit: params.limit,
    };
    let (items, total) = state.moderation.find_page(&filter).await?;

    info!("Found {} moderation items ({} on this page)", total, items.len());
    Ok(Json(ModerationListResponseDTO {
        items: items.into_iter().map(ModerationItemDTO::from).collect(),
        pagination: PaginationDTO::new(params.page, params.limit, total),
    }))
}

#[instrument(skip(state), fields(item_id = %item_id))]
pub async fn get_moderation_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<ModerationItemDTO>, AppError> {
    if !ITEM_ID_RE.is_match(&item_id) {
        return Err(AppError::bad_request("Invalid item id"));
    }

    let item = state
        .moderation
        .read(&item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Moderation item not found"))?;

    Ok(Json(ModerationItemDTO::from(item)))
}

#[debug_handler]
#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id, item_id = %body.item_id, status = ?body.status))]
pub async fn update_moderation_item(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<User>,
    Json(body): Json<UpdateModerationDTO>,
) -> Result<Json<ModerationUpdateResponseDTO>, AppError> {
    debug!("Reviewing moderation item");
    // 1. Validare il body (id ben formato, note non troppo lunghe)
    // 2. Leggere l'elemento, NOT_FOUND se non esiste
    // 3. Stesso stato: aggiornamento idempotente di note, revisore e timestamp
    //    Stato diverso: la transizione deve essere ammessa (gli stati finali restano tali), altrimenti CONFLICT
    // 4. Scrivere la decisione solo se lo stato non è cambiato nel frattempo
    // 5. Ritornare { success: true, item }
    body.validate()?;

    let item = state
        .moderation
        .read(&body.item_id)
        .await?
        .ok_or_else(|| {
            warn!("Moderation item not found");
            AppError::not_found("Moderation item not found")
        })?;

    if item.status != body.status && !item.status.can_transition_to(body.status) {
        warn!("Rejected transition {:?} -> {:?}", item.status, body.status);
        return Err(AppError::conflict("Transition not allowed").with_details(format!(
            "Cannot move an item from {:?} to {:?}",
            item.status, body.status
        )));
    }

    let review = ReviewModerationDTO {
        expected_status: item.status,
        status: body.status,
        admin_notes: body.admin_notes.clone(),
        reviewed_by: admin.user_id,
        reviewed_at: Utc::now(),
    };
    let updated = state
        .moderation
        .update(&body.item_id, &review)
        .await
        .map_err(review_write_error)?;

    info!("Moderation item now {:?}", updated.status);
    Ok(Json(ModerationUpdateResponseDTO {
        success: true,
        item: ModerationItemDTO::from(updated),
    }))
}

/// `RowNotFound` dalla scrittura condizionata significa che lo stato letto non è più attuale
fn review_write_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::RowNotFound => {
            warn!("Item changed while it was being reviewed");
            AppError::conflict("Item was updated by someone else, reload and retry")
        }
        other => AppError::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::review_write_error;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn stale_write_is_a_conflict() {
        let response = review_write_error(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn other_database_errors_keep_their_mapping() {
        let response = review_write_error(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
