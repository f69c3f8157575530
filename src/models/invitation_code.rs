use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, msg};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationCode {
    pub id: String,
    pub code: String,
    pub max_uses: i32,
    pub current_uses: i32,
    pub is_active: bool,
    /// Admin user who created the code
    pub created_by: Option<String>,
    pub created_at: i64,
    /// None = never expires
    pub expires_at: Option<i64>,
}

impl InvitationCode {
    pub fn is_exhausted(&self) -> bool {
        self.current_uses >= self.max_uses
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

fn default_max_uses() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CreateInvitationCode {
    #[serde(default = "default_max_uses")]
    pub max_uses: i32,
    /// Days until expiry; zero or negative means no expiry.
    #[serde(default)]
    pub days_valid: i64,
}

impl CreateInvitationCode {
    pub fn validate(&self) -> Result<()> {
        if self.max_uses < 1 {
            return Err(AppError::BadRequest(msg::MAX_USES_INVALID.into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCodeStatus {
    pub is_active: bool,
}

/// Record of a single redemption.
#[derive(Debug, Clone, Serialize)]
pub struct CodeUsage {
    pub id: String,
    pub invitation_code_id: String,
    pub user_id: String,
    pub used_at: i64,
}
