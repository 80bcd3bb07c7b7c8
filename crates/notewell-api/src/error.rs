use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use notewell_types::api::Envelope;

use crate::token::AuthError;

/// Failure taxonomy for every handler. Cache failures never appear here:
/// they are downgraded to a miss inside notewell-cache.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    NotFound(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("account email is not verified")]
    NotVerified,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
    #[error("mail transport failure: {0}")]
    Mail(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::Duplicate(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotVerified => StatusCode::FORBIDDEN,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        // Token failures stay distinguishable internally but collapse to
        // one caller-visible message.
        let message = match &self {
            ApiError::Auth(AuthError::MissingToken) => "Authorization token is missing".to_string(),
            ApiError::Auth(_) => "Invalid authentication token".to_string(),
            other => other.to_string(),
        };

        let body = Envelope::empty(message, status.as_u16());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ApiError::Validation("bad".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Duplicate("dup".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound("gone".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotVerified.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Mail("down".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn every_token_failure_maps_to_unauthorized() {
        for auth in [
            AuthError::MissingToken,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::AudienceMismatch,
            AuthError::Unauthorized,
        ] {
            assert_eq!(ApiError::Auth(auth).status(), StatusCode::UNAUTHORIZED);
        }
    }
}
