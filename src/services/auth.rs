use std::sync::Arc;

use rusqlite::{Connection, TransactionBehavior};

use crate::clock::Clock;
use crate::crypto::{PasswordParams, hash_password, hash_secret, verify_password};
use crate::db::queries;
use crate::error::{AppError, AuthFailure, OptionExt, Result, TokenError, msg};
use crate::jwt::{
    REMEMBER_ME_TTL_SECS, SESSION_TTL_SECS, SessionClaims, TokenSigner, VerifiedSession,
};
use crate::models::*;

use super::insert_license_with_modules;

const REGISTRATION_GRANT_NOTES: &str = "granted on registration";

/// Registration, login and session tokens.
#[derive(Clone)]
pub struct AuthService {
    tokens: TokenSigner,
    password_params: PasswordParams,
    clock: Arc<dyn Clock>,
    /// When set, every new account gets a one-device license for this module
    default_module: Option<String>,
}

impl AuthService {
    pub fn new(
        tokens: TokenSigner,
        password_params: PasswordParams,
        clock: Arc<dyn Clock>,
        default_module: Option<String>,
    ) -> Self {
        Self {
            tokens,
            password_params,
            clock,
            default_module: default_module
                .map(|m| normalize_module_name(&m))
                .filter(|m| !m.is_empty()),
        }
    }

    pub fn password_params(&self) -> &PasswordParams {
        &self.password_params
    }

    /// Create an account by redeeming an invitation code.
    ///
    /// Gates run in order: code unknown or inactive, code exhausted, code
    /// expired, email taken. The gates, the user insert and the guarded
    /// use-counter increment share one IMMEDIATE transaction, so a code can
    /// never be redeemed more than `max_uses` times.
    pub fn register(
        &self,
        conn: &mut Connection,
        req: &RegisterRequest,
        ip_address: Option<&str>,
    ) -> Result<AuthResponse> {
        req.validate()?;
        let email = normalize_email(&req.email);
        let code_value = req.invitation_code.trim();

        // Hash before taking the write lock.
        let password_hash = hash_password(&req.password, &self.password_params)?;
        let now = self.clock.now();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let code = queries::get_invitation_code_by_code(&tx, code_value)?
            .filter(|c| c.is_active)
            .ok_or(AuthFailure::InvalidCode)?;
        if code.is_exhausted() {
            return Err(AuthFailure::CodeExhausted.into());
        }
        if code.is_expired(now) {
            return Err(AuthFailure::CodeExpired.into());
        }
        if queries::email_exists(&tx, &email)? {
            return Err(AuthFailure::EmailTaken.into());
        }

        let user = queries::create_user(
            &tx,
            &NewUser {
                email: &email,
                password_hash: &password_hash,
                full_name: req.full_name.trim(),
                company: non_blank(req.company.as_deref()),
                phone: non_blank(req.phone.as_deref()),
                is_admin: false,
            },
            now,
        )?;

        if !queries::try_redeem_invitation_code(&tx, &code.id)? {
            return Err(AuthFailure::CodeExhausted.into());
        }
        queries::record_code_usage(&tx, &code.id, &user.id, now)?;

        if let Some(module) = &self.default_module {
            let license = insert_license_with_modules(
                &tx,
                &NewLicense {
                    client_name: &user.full_name,
                    client_email: &user.email,
                    max_devices: 1,
                    expires_at: None,
                    notes: REGISTRATION_GRANT_NOTES,
                },
                std::slice::from_ref(module),
                now,
            )?;
            tracing::info!(user_id = %user.id, license_id = %license.id, module = %module, "Default license granted");
        }

        let token = self.start_session(&tx, &user, ip_address, SESSION_TTL_SECS, now)?;
        tx.commit()?;

        tracing::info!(user_id = %user.id, code_id = %code.id, "User registered");
        Ok(AuthResponse { token, user })
    }

    /// Authenticate with email and password.
    ///
    /// Unknown email and wrong password produce the same failure.
    pub fn login(&self, conn: &Connection, req: &LoginRequest, ip_address: Option<&str>) -> Result<AuthResponse> {
        let email = normalize_email(&req.email);

        let Some(user) = queries::get_user_by_email(conn, &email)? else {
            tracing::debug!("Login rejected: unknown email");
            return Err(AuthFailure::InvalidCredentials.into());
        };
        if !verify_password(&req.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthFailure::InvalidCredentials.into());
        }
        if !user.is_active {
            return Err(AuthFailure::AccountDisabled.into());
        }

        let ttl = if req.remember { REMEMBER_ME_TTL_SECS } else { SESSION_TTL_SECS };
        let now = self.clock.now();
        let token = self.start_session(conn, &user, ip_address, ttl, now)?;

        tracing::info!(user_id = %user.id, remember = req.remember, "User logged in");
        Ok(AuthResponse { token, user })
    }

    fn start_session(
        &self,
        conn: &Connection,
        user: &User,
        ip_address: Option<&str>,
        ttl_secs: i64,
        now: i64,
    ) -> Result<String> {
        let claims = SessionClaims {
            user_id: user.id.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        };
        let token = self.tokens.issue(claims, now, ttl_secs)?;
        queries::create_session(conn, &user.id, &hash_secret(&token), ip_address, now, now + ttl_secs)?;
        Ok(token)
    }

    /// Verify a session token against the service clock.
    pub fn validate_token(&self, token: &str) -> std::result::Result<VerifiedSession, TokenError> {
        self.tokens.verify(token, self.clock.now())
    }

    /// Admin flag carried by a valid token. An absent claim reads as false.
    pub fn is_admin(&self, token: &str) -> std::result::Result<bool, TokenError> {
        Ok(self.validate_token(token)?.is_admin)
    }

    pub fn get_profile(&self, conn: &Connection, user_id: &str) -> Result<User> {
        queries::get_user_by_id(conn, user_id)?.or_not_found(msg::USER_NOT_FOUND)
    }

    pub fn list_users(&self, conn: &Connection) -> Result<Vec<User>> {
        queries::list_users(conn)
    }

    pub fn set_user_status(&self, conn: &Connection, user_id: &str, is_active: bool) -> Result<User> {
        if !queries::set_user_active(conn, user_id, is_active)? {
            return Err(AppError::NotFound(msg::USER_NOT_FOUND.into()));
        }
        tracing::info!(user_id = %user_id, is_active, "User status changed");
        self.get_profile(conn, user_id)
    }

    pub fn set_user_admin(&self, conn: &Connection, user_id: &str, is_admin: bool) -> Result<User> {
        if !queries::set_user_admin(conn, user_id, is_admin)? {
            return Err(AppError::NotFound(msg::USER_NOT_FOUND.into()));
        }
        tracing::info!(user_id = %user_id, is_admin, "User admin flag changed");
        self.get_profile(conn, user_id)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
