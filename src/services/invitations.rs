use std::sync::Arc;

use rusqlite::Connection;

use crate::clock::Clock;
use crate::crypto::generate_invitation_code;
use crate::db::queries;
use crate::error::{AppError, OptionExt, Result, msg};
use crate::models::{CreateInvitationCode, InvitationCode};
use crate::util::expiry_from_days;

/// Creation and status of invitation codes. Redemption happens inside
/// registration.
#[derive(Clone)]
pub struct InvitationLedger {
    clock: Arc<dyn Clock>,
}

impl InvitationLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn create_code(
        &self,
        conn: &Connection,
        admin_id: Option<&str>,
        input: &CreateInvitationCode,
    ) -> Result<InvitationCode> {
        input.validate()?;
        let now = self.clock.now();
        let code = queries::create_invitation_code(
            conn,
            &generate_invitation_code(),
            input.max_uses,
            admin_id,
            now,
            expiry_from_days(now, input.days_valid),
        )?;
        tracing::info!(code_id = %code.id, max_uses = code.max_uses, "Invitation code created");
        Ok(code)
    }

    pub fn list_codes(&self, conn: &Connection) -> Result<Vec<InvitationCode>> {
        queries::list_invitation_codes(conn)
    }

    /// Toggle a code. Users already registered with it are unaffected.
    pub fn set_status(&self, conn: &Connection, id: &str, is_active: bool) -> Result<InvitationCode> {
        if !queries::set_invitation_code_active(conn, id, is_active)? {
            return Err(AppError::NotFound(msg::CODE_NOT_FOUND.into()));
        }
        queries::get_invitation_code_by_id(conn, id)?.or_not_found(msg::CODE_NOT_FOUND)
    }
}
