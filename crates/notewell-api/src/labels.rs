use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use notewell_types::api::{Envelope, LabelRequest};
use notewell_types::models::Label;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::notes::label_from_row;

pub async fn create_label(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<LabelRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.is_empty() || req.name.len() > 50 {
        return Err(ApiError::Validation("label name must be 1-50 characters".into()));
    }

    let label_id = state.db.insert_label(auth.user_id, &req.name)?;
    let label = Label {
        id: label_id,
        name: req.name,
        user_id: auth.user_id,
    };

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Label created successfully", 201, label)),
    ))
}

pub async fn list_labels(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let rows = state.db.list_labels(auth.user_id)?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("no labels found".into()));
    }

    let labels: Vec<Label> = rows.into_iter().map(label_from_row).collect();
    Ok(Json(Envelope::with_data("Labels retrieved successfully", 200, labels)))
}

pub async fn update_label(
    State(state): State<AppState>,
    Path(label_id): Path<i64>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<LabelRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.is_empty() || req.name.len() > 50 {
        return Err(ApiError::Validation("label name must be 1-50 characters".into()));
    }

    let updated = state.db.update_label(auth.user_id, label_id, &req.name)?;
    if !updated {
        return Err(ApiError::NotFound("label not found".into()));
    }

    let label = Label {
        id: label_id,
        name: req.name,
        user_id: auth.user_id,
    };
    Ok(Json(Envelope::with_data("Label updated successfully", 200, label)))
}

pub async fn delete_label(
    State(state): State<AppState>,
    Path(label_id): Path<i64>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.db.delete_label(auth.user_id, label_id)?;
    if !deleted {
        return Err(ApiError::NotFound("label not found".into()));
    }

    Ok(Json(Envelope::empty("Label deleted successfully", 200)))
}

/// Attaching an already-attached label is an explicit conflict, not a
/// no-op. The cached note snapshot is left alone: labels reach it on the
/// next note write.
pub async fn attach_label(
    State(state): State<AppState>,
    Path((note_id, label_id)): Path<(i64, i64)>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    state
        .db
        .get_note(auth.user_id, note_id)?
        .ok_or_else(|| ApiError::NotFound("note not found".into()))?;
    state
        .db
        .get_label(auth.user_id, label_id)?
        .ok_or_else(|| ApiError::NotFound("label not found".into()))?;

    let added = state.db.attach_label(note_id, label_id)?;
    if !added {
        return Err(ApiError::Duplicate("label already attached to note".into()));
    }

    Ok(Json(Envelope::empty("Label attached successfully", 200)))
}

/// Detaching an absent edge is an explicit not-found, not a no-op.
pub async fn detach_label(
    State(state): State<AppState>,
    Path((note_id, label_id)): Path<(i64, i64)>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    state
        .db
        .get_note(auth.user_id, note_id)?
        .ok_or_else(|| ApiError::NotFound("note not found".into()))?;
    state
        .db
        .get_label(auth.user_id, label_id)?
        .ok_or_else(|| ApiError::NotFound("label not found".into()))?;

    let removed = state.db.detach_label(note_id, label_id)?;
    if !removed {
        return Err(ApiError::NotFound("label not attached to note".into()));
    }

    Ok(Json(Envelope::empty("Label detached successfully", 200)))
}
