use serde::{Deserialize, Serialize};

/// Custom claims carried by a session token.
/// Standard claims (iat, nbf, exp) are handled by jwt-simple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: String,
    pub email: String,
    /// Missing means not an admin.
    #[serde(default)]
    pub is_admin: bool,
}

/// Claims of a token that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
    pub expires_at: i64,
}
