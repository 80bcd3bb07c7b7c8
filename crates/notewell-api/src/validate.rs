//! Payload policy, enforced before anything reaches the store.

use notewell_types::api::RegisterRequest;

use crate::error::ApiError;

const PASSWORD_SYMBOLS: &str = "@$!%*?&";

pub fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_name("first_name", &req.first_name)?;
    validate_name("last_name", &req.last_name)?;
    validate_email(&req.email)?;
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ApiError> {
    let charset_ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if username.len() < 3 || username.len() > 50 || !charset_ok {
        return Err(ApiError::Validation(
            "username must be 3-50 characters of letters, numbers, hyphens, and underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if password.len() < 8 || password.len() > 250 || !has_lower || !has_upper || !has_digit || !has_symbol {
        return Err(ApiError::Validation(format!(
            "password must be 8-250 characters with at least one lowercase letter, one uppercase letter, one digit, and one of {PASSWORD_SYMBOLS}"
        )));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() || value.len() > 20 {
        return Err(ApiError::Validation(format!(
            "{field} must be 1-20 characters"
        )));
    }
    Ok(())
}

/// `local@domain.tld` shape, nothing fancier.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::Validation("email address is malformed".into());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;

    if local.is_empty()
        || host.is_empty()
        || tld.is_empty()
        || domain.contains('@')
        || email.chars().any(|c| c.is_whitespace())
    {
        return Err(invalid());
    }
    Ok(())
}
