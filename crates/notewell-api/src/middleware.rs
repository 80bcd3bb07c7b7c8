use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use notewell_db::models::UserRow;

use crate::AppState;
use crate::error::ApiError;
use crate::token::{Audience, AuthError};

/// Verified identity attached to every protected request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Extract the bearer token from the Authorization header and resolve it
/// to a known user before any handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

    let user = resolve_user(&state, token)?;

    req.extensions_mut().insert(AuthUser { user_id: user.id });
    Ok(next.run(req).await)
}

/// Token → user row, shared by the middleware and the fetch-user
/// endpoint. The token must carry the login audience and name an
/// existing account; any resolution failure is Unauthorized.
pub fn resolve_user(state: &AppState, token: &str) -> Result<UserRow, AuthError> {
    let claims = state.tokens.verify(token, Audience::Login)?;

    state
        .db
        .get_user_by_id(claims.sub)
        .map_err(|_| AuthError::Unauthorized)?
        .ok_or(AuthError::Unauthorized)
}
