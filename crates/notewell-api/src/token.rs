use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use thiserror::Error;

use notewell_types::api::Claims;

/// Token purposes. A token minted for one audience never authorizes
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Register,
    Login,
    ResetPassword,
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Register => "register_user",
            Audience::Login => "login_user",
            Audience::ResetPassword => "reset_password",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization token is missing")]
    MissingToken,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token audience mismatch")]
    AudienceMismatch,
    #[error("user authentication failed")]
    Unauthorized,
}

pub const TOKEN_TTL_HOURS: i64 = 1;

/// Issues and verifies the signed, audience-scoped tokens. Stateless —
/// no revocation list, so compromise is bounded only by the TTL.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
}

impl TokenService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn issue(&self, user_id: i64, audience: Audience) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id,
            aud: audience.as_str().to_string(),
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    pub fn verify(&self, token: &str, audience: Audience) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_audience(&[audience.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
            _ => AuthError::InvalidSignature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret")
    }

    #[test]
    fn issued_tokens_verify_for_their_audience() {
        let tokens = service();
        let token = tokens.issue(42, Audience::Login).unwrap();

        let claims = tokens.verify(&token, Audience::Login).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.aud, "login_user");
    }

    #[test]
    fn audience_is_not_transferable() {
        let tokens = service();

        let register = tokens.issue(1, Audience::Register).unwrap();
        assert!(matches!(
            tokens.verify(&register, Audience::Login),
            Err(AuthError::AudienceMismatch)
        ));

        let login = tokens.issue(1, Audience::Login).unwrap();
        assert!(matches!(
            tokens.verify(&login, Audience::Register),
            Err(AuthError::AudienceMismatch)
        ));
        assert!(matches!(
            tokens.verify(&login, Audience::ResetPassword),
            Err(AuthError::AudienceMismatch)
        ));
    }

    #[test]
    fn expiry_is_reported_as_its_own_condition() {
        let tokens = service();
        let claims = Claims {
            sub: 1,
            aud: Audience::Login.as_str().to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp() as usize,
        };
        let stale = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            tokens.verify(&stale, Audience::Login),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn garbage_and_foreign_signatures_are_invalid() {
        let tokens = service();

        assert!(matches!(
            tokens.verify("not-a-token", Audience::Login),
            Err(AuthError::InvalidSignature)
        ));

        let foreign = TokenService::new("other-secret").issue(1, Audience::Login).unwrap();
        assert!(matches!(
            tokens.verify(&foreign, Audience::Login),
            Err(AuthError::InvalidSignature)
        ));
    }
}
