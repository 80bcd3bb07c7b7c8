use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;

use notewell_db::models::NoteRow;
use notewell_types::api::{CreateNoteRequest, Envelope, UpdateNoteRequest};
use notewell_types::models::{Label, Note, NoteSnapshot};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct ArchiveQuery {
    pub archive: bool,
}

#[derive(Debug, Deserialize)]
pub struct TrashQuery {
    pub trash: bool,
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let reminder = req.reminder.map(|r| r.to_rfc3339());

    let note_id = state.db.insert_note(
        auth.user_id,
        &req.title,
        &req.description,
        &req.color,
        reminder.as_deref(),
        req.is_archive,
        req.is_trash,
    )?;

    let row = state
        .db
        .get_note(auth.user_id, note_id)?
        .ok_or_else(|| ApiError::NotFound("note not found".into()))?;
    let snapshot = refresh_cache(&state, &row).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Note created successfully", 201, snapshot)),
    ))
}

/// List the caller's notes. The cache is consulted first and any hit is
/// returned as-is; a miss falls through to the store (active notes
/// joined with labels) without writing the result back — only the write
/// path populates the cache.
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    if let Some(cached) = state.cache.retrieve_all(auth.user_id).await {
        let mut snapshots: Vec<NoteSnapshot> = cached.into_values().collect();
        snapshots.sort_by_key(|s| s.note.id);
        return Ok(Json(Envelope::with_data(
            "Notes retrieved successfully",
            200,
            snapshots,
        )));
    }

    let rows = state.db.list_notes_active(auth.user_id)?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("no notes found".into()));
    }

    let snapshots = join_labels(&state, rows)?;
    Ok(Json(Envelope::with_data(
        "Notes retrieved successfully",
        200,
        snapshots,
    )))
}

/// Archived listings bypass the cache and read the store directly.
pub async fn list_archived(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let rows = state.db.list_notes_archived(auth.user_id)?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("no notes found".into()));
    }

    let snapshots = join_labels(&state, rows)?;
    Ok(Json(Envelope::with_data(
        "Archived notes retrieved successfully",
        200,
        snapshots,
    )))
}

pub async fn list_trashed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let rows = state.db.list_notes_trashed(auth.user_id)?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("no notes found".into()));
    }

    let snapshots = join_labels(&state, rows)?;
    Ok(Json(Envelope::with_data(
        "Trashed notes retrieved successfully",
        200,
        snapshots,
    )))
}

/// Only title and description are updatable in place.
pub async fn update_note(
    State(state): State<AppState>,
    Path(note_id): Path<i64>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state
        .db
        .update_note(auth.user_id, note_id, &req.title, &req.description)?;
    if !updated {
        return Err(ApiError::NotFound("note not found".into()));
    }

    let row = state
        .db
        .get_note(auth.user_id, note_id)?
        .ok_or_else(|| ApiError::NotFound("note not found".into()))?;
    let snapshot = refresh_cache(&state, &row).await?;

    Ok(Json(Envelope::with_data("Note updated successfully", 200, snapshot)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(note_id): Path<i64>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.db.delete_note(auth.user_id, note_id)?;
    if !deleted {
        return Err(ApiError::NotFound("note not found".into()));
    }

    state.cache.delete(auth.user_id, note_id).await;

    Ok(Json(Envelope::empty("Note deleted successfully", 200)))
}

pub async fn set_archive(
    State(state): State<AppState>,
    Path(note_id): Path<i64>,
    Query(q): Query<ArchiveQuery>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let changed = state.db.set_note_archive(auth.user_id, note_id, q.archive)?;
    if !changed {
        return Err(ApiError::NotFound("note not found".into()));
    }

    let row = state
        .db
        .get_note(auth.user_id, note_id)?
        .ok_or_else(|| ApiError::NotFound("note not found".into()))?;
    let snapshot = refresh_cache(&state, &row).await?;

    let message = if q.archive {
        "Note archived successfully"
    } else {
        "Note unarchived successfully"
    };
    Ok(Json(Envelope::with_data(message, 200, snapshot)))
}

pub async fn set_trash(
    State(state): State<AppState>,
    Path(note_id): Path<i64>,
    Query(q): Query<TrashQuery>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let changed = state.db.set_note_trash(auth.user_id, note_id, q.trash)?;
    if !changed {
        return Err(ApiError::NotFound("note not found".into()));
    }

    let row = state
        .db
        .get_note(auth.user_id, note_id)?
        .ok_or_else(|| ApiError::NotFound("note not found".into()))?;
    let snapshot = refresh_cache(&state, &row).await?;

    let message = if q.trash {
        "Note trashed successfully"
    } else {
        "Note restored successfully"
    };
    Ok(Json(Envelope::with_data(message, 200, snapshot)))
}

/// Rebuild the `(user, note)` cache entry from the committed row. Every
/// note mutation goes through here before its handler returns; label
/// attach/detach intentionally does not, so snapshots carry labels only
/// as of the last note write.
pub(crate) async fn refresh_cache(state: &AppState, row: &NoteRow) -> ApiResult<NoteSnapshot> {
    let labels = state
        .db
        .labels_for_note(row.id)?
        .into_iter()
        .map(label_from_row)
        .collect();

    let snapshot = NoteSnapshot {
        note: note_from_row(row),
        labels,
    };

    if let Err(e) = state.cache.save(&snapshot).await {
        warn!(user_id = row.user_id, note_id = row.id, error = %e, "cache save rejected");
    }

    Ok(snapshot)
}

fn join_labels(state: &AppState, rows: Vec<NoteRow>) -> ApiResult<Vec<NoteSnapshot>> {
    let note_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let edges = state.db.labels_for_notes(&note_ids)?;

    let mut by_note: HashMap<i64, Vec<Label>> = HashMap::new();
    for (note_id, label_row) in edges {
        by_note.entry(note_id).or_default().push(label_from_row(label_row));
    }

    Ok(rows
        .iter()
        .map(|row| NoteSnapshot {
            note: note_from_row(row),
            labels: by_note.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}

fn note_from_row(row: &NoteRow) -> Note {
    let reminder = row.reminder.as_deref().and_then(|raw| {
        raw.parse::<chrono::DateTime<chrono::Utc>>()
            .map_err(|e| warn!(note_id = row.id, error = %e, "corrupt reminder timestamp"))
            .ok()
    });

    Note {
        id: row.id,
        title: row.title.clone(),
        description: row.description.clone(),
        color: row.color.clone(),
        reminder,
        is_archive: row.is_archive,
        is_trash: row.is_trash,
        user_id: row.user_id,
    }
}

pub(crate) fn label_from_row(row: notewell_db::models::LabelRow) -> Label {
    Label {
        id: row.id,
        name: row.name,
        user_id: row.user_id,
    }
}
