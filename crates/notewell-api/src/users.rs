use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use notewell_db::models::UserRow;
use notewell_types::api::{
    Envelope, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    ResetPasswordRequest, UserView,
};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware;
use crate::token::Audience;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate::validate_registration(&req)?;

    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Duplicate("username already registered".into()));
    }

    let password_hash = hash_password(&req.password)?;

    let user_id = state.db.create_user(
        &req.username,
        &password_hash,
        &req.first_name,
        &req.last_name,
        &req.email,
    )?;

    // Verification token goes out by email; the account row is already
    // committed, so a transport failure leaves a recoverable half-state.
    let token = state.tokens.issue(user_id, Audience::Register)?;
    state
        .mailer
        .send(
            &req.email,
            "Verify your account",
            &format!("Use this token to verify your account: {token}"),
        )
        .await?;

    let view = UserView {
        id: user_id,
        username: req.username,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        is_verified: false,
    };

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("User registered successfully", 201, view)),
    ))
}

pub async fn verify_user(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
) -> ApiResult<impl IntoResponse> {
    let claims = state.tokens.verify(&q.token, Audience::Register)?;

    let user = state
        .db
        .get_user_by_id(claims.sub)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    state.db.mark_verified(user.id)?;

    Ok(Json(Envelope::empty("User verified successfully", 200)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    // Unknown username and wrong password fail identically.
    let user = match state.db.get_user_by_username(&req.username)? {
        Some(user) if verify_password(&req.password, &user.password) => user,
        _ => return Err(ApiError::InvalidCredentials),
    };

    if !user.is_verified {
        return Err(ApiError::NotVerified);
    }

    let token = state.tokens.issue(user.id, Audience::Login)?;

    Ok(Json(Envelope::with_data(
        "User logged in successfully",
        200,
        LoginResponse {
            user_id: user.id,
            username: user.username,
            token,
        },
    )))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    validate::validate_email(&req.email)?;

    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or_else(|| ApiError::NotFound("no account for that email".into()))?;

    let token = state.tokens.issue(user.id, Audience::ResetPassword)?;
    state
        .mailer
        .send(
            &user.email,
            "Reset your password",
            &format!("Use this token to reset your password: {token}"),
        )
        .await?;

    Ok(Json(Envelope::empty("Password reset email sent", 200)))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    validate::validate_password(&req.new_password)?;

    let claims = state.tokens.verify(&req.token, Audience::ResetPassword)?;
    let user = state
        .db
        .get_user_by_id(claims.sub)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let password_hash = hash_password(&req.new_password)?;
    state.db.set_password(user.id, &password_hash)?;

    Ok(Json(Envelope::empty("Password reset successfully", 200)))
}

/// Token → user resolution for deployments that keep the auth round trip
/// external. The middleware calls [`middleware::resolve_user`] directly.
pub async fn fetch_user(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
) -> ApiResult<impl IntoResponse> {
    let user = middleware::resolve_user(&state, &q.token)?;

    Ok(Json(Envelope::with_data(
        "User fetched successfully",
        200,
        user_view(user),
    )))
}

fn user_view(row: UserRow) -> UserView {
    UserView {
        id: row.id,
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        is_verified: row.is_verified,
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Store(anyhow::anyhow!("password hashing failed: {e}")))
}

pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_never_the_plaintext() {
        let first = hash_password("Str0ng!Pass").unwrap();
        let second = hash_password("Str0ng!Pass").unwrap();

        assert_ne!(first, "Str0ng!Pass");
        assert_ne!(first, second);
        assert!(verify_password("Str0ng!Pass", &first));
        assert!(verify_password("Str0ng!Pass", &second));
        assert!(!verify_password("WrongPass1!", &first));
    }

    #[test]
    fn corrupt_hashes_never_verify() {
        assert!(!verify_password("Str0ng!Pass", "not-a-phc-string"));
    }
}
