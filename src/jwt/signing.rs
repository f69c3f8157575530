use jwt_simple::JWTError;
use jwt_simple::prelude::*;

use super::{SessionClaims, VerifiedSession};
use crate::error::{AppError, Result, TokenError};

pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;
pub const REMEMBER_ME_TTL_SECS: i64 = 30 * 24 * 60 * 60;
pub const MIN_SECRET_LEN: usize = 32;

/// HS256 signer/verifier for session tokens.
///
/// Both issuance and verification take `now` from the caller, so the
/// service clock decides expiry. `clock_skew_secs` is the tolerance.
#[derive(Clone)]
pub struct TokenSigner {
    key: HS256Key,
    clock_skew_secs: u64,
}

impl TokenSigner {
    pub fn new(secret: &[u8], clock_skew_secs: u64) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Internal(format!(
                "JWT secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                secret.len()
            )));
        }
        Ok(Self {
            key: HS256Key::from_bytes(secret),
            clock_skew_secs,
        })
    }

    /// Sign `claims` as issued at `now`, valid for `ttl_secs`.
    pub fn issue(&self, claims: SessionClaims, now: i64, ttl_secs: i64) -> Result<String> {
        let ttl = Duration::from_secs(ttl_secs.max(0) as u64);
        let issued = Duration::from_secs(now.max(0) as u64);

        let mut jwt_claims = Claims::with_custom_claims(claims, ttl);
        jwt_claims.issued_at = Some(issued);
        jwt_claims.invalid_before = Some(issued);
        jwt_claims.expires_at = Some(issued + ttl);

        self.key
            .authenticate(jwt_claims)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature, algorithm and expiry as of `now`, then decode typed claims.
    pub fn verify(&self, token: &str, now: i64) -> std::result::Result<VerifiedSession, TokenError> {
        let options = VerificationOptions {
            artificial_time: Some(Duration::from_secs(now.max(0) as u64)),
            time_tolerance: Some(Duration::from_secs(self.clock_skew_secs)),
            ..Default::default()
        };

        let claims = self
            .key
            .verify_token::<SessionClaims>(token, Some(options))
            .map_err(classify)?;

        let expires_at = claims
            .expires_at
            .ok_or_else(|| TokenError::Malformed("missing exp claim".into()))?;

        Ok(VerifiedSession {
            user_id: claims.custom.user_id,
            email: claims.custom.email,
            is_admin: claims.custom.is_admin,
            expires_at: expires_at.as_secs() as i64,
        })
    }
}

fn classify(err: jwt_simple::Error) -> TokenError {
    match err.downcast_ref::<JWTError>() {
        Some(JWTError::TokenHasExpired) => TokenError::Expired,
        Some(JWTError::InvalidAuthenticationTag) | Some(JWTError::InvalidSignature) => {
            TokenError::InvalidSignature
        }
        Some(JWTError::AlgorithmMismatch) => TokenError::AlgorithmMismatch,
        _ => TokenError::Malformed(err.to_string()),
    }
}
