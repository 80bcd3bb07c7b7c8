pub mod error;
pub mod labels;
pub mod mailer;
pub mod middleware;
pub mod notes;
pub mod token;
pub mod users;
pub mod validate;

use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
};

use notewell_cache::NoteCache;
use notewell_db::Database;

use crate::mailer::Mailer;
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub cache: NoteCache,
    pub tokens: TokenService,
    pub mailer: Mailer,
}

/// Public + bearer-protected routes. The server binary and the
/// integration tests both mount this.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(users::register))
        .route("/auth/verify", get(users::verify_user))
        .route("/auth/login", post(users::login))
        .route("/auth/forgot", post(users::forgot_password))
        .route("/auth/reset", post(users::reset_password))
        .route("/auth/fetch-user", get(users::fetch_user))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route("/notes/archived", get(notes::list_archived))
        .route("/notes/trashed", get(notes::list_trashed))
        .route("/notes/{note_id}", put(notes::update_note).delete(notes::delete_note))
        .route("/notes/{note_id}/archive", patch(notes::set_archive))
        .route("/notes/{note_id}/trash", patch(notes::set_trash))
        .route("/labels", post(labels::create_label).get(labels::list_labels))
        .route("/labels/{label_id}", put(labels::update_label).delete(labels::delete_label))
        .route(
            "/notes/{note_id}/labels/{label_id}",
            post(labels::attach_label).delete(labels::detach_label),
        )
        .layer(axum_middleware::from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state);

    Router::new().merge(public).merge(protected)
}
