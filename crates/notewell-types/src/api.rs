use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

// -- JWT Claims --

/// JWT claims shared by the token service and the REST middleware.
/// Canonical definition lives here in notewell-types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub aud: String,
    pub exp: usize,
}

// -- Response envelope --

/// Every endpoint answers with `{message, status, data?}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn with_data(message: impl Into<String>, status: u16, data: T) -> Self {
        Self {
            message: message.into(),
            status,
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn empty(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            data: None,
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// User record as exposed to clients. The password hash never leaves the
/// store layer.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_verified: bool,
}

// -- Notes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNoteRequest {
    pub title: String,
    pub description: String,
    pub color: String,
    #[serde(default)]
    pub reminder: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_archive: bool,
    #[serde(default)]
    pub is_trash: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub description: String,
}

// -- Labels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelRequest {
    pub name: String,
}
