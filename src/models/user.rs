use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, msg};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Basic email format validation.
///
/// Validates that email has:
/// - Exactly one @ symbol
/// - Non-empty local part without spaces
/// - A domain with at least one inner dot
///
/// Not RFC 5322.
pub fn validate_email_format(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(AppError::BadRequest(msg::EMAIL_EMPTY.into()));
    }

    let Some((local_part, domain_part)) = email.split_once('@') else {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    };

    if local_part.is_empty() || local_part.contains(' ') || domain_part.contains('@') {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }

    if domain_part.is_empty()
        || !domain_part.contains('.')
        || domain_part.starts_with('.')
        || domain_part.ends_with('.')
    {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }

    Ok(())
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registered account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: i64,
}

/// Row inserted by registration or bootstrap seeding.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub company: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub invitation_code: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email_format(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(msg::PASSWORD_TOO_SHORT.into()));
        }
        if self.full_name.trim().is_empty() {
            return Err(AppError::BadRequest(msg::NAME_EMPTY.into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserStatus {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetUserAdmin {
    pub is_admin: bool,
}

/// One issued session token. Only a hash of the token is stored.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub ip_address: Option<String>,
    pub created_at: i64,
    pub expires_at: i64,
}
