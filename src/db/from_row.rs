//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! Models implement `FromRow` to describe how they are built from a row;
//! `query_one` / `query_all` cover the common single/multi-row patterns.
//! Each `*_COLS` constant lists columns in the order `from_row` reads them.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USER_COLS: &str =
    "id, email, password_hash, full_name, company, phone, is_active, is_admin, created_at";

pub const SESSION_COLS: &str = "id, user_id, token_hash, ip_address, created_at, expires_at";

pub const INVITATION_CODE_COLS: &str =
    "id, code, max_uses, current_uses, is_active, created_by, created_at, expires_at";

pub const CODE_USAGE_COLS: &str = "id, invitation_code_id, user_id, used_at";

pub const LICENSE_COLS: &str = "id, license_code, client_name, client_email, is_active, max_devices, created_at, expires_at, notes";

pub const DEVICE_COLS: &str =
    "id, license_id, machine_id, device_name, first_activation, last_check";

pub const MODULE_COLS: &str = "id, license_id, module_name, added_at";

pub const PRODUCT_COLS: &str = "id, name, display_name, description, is_active, created_at";

// ============ FromRow Implementations ============

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            full_name: row.get(3)?,
            company: row.get(4)?,
            phone: row.get(5)?,
            is_active: row.get::<_, i32>(6)? != 0,
            is_admin: row.get::<_, i32>(7)? != 0,
            created_at: row.get(8)?,
        })
    }
}

impl FromRow for Session {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Session {
            id: row.get(0)?,
            user_id: row.get(1)?,
            token_hash: row.get(2)?,
            ip_address: row.get(3)?,
            created_at: row.get(4)?,
            expires_at: row.get(5)?,
        })
    }
}

impl FromRow for InvitationCode {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(InvitationCode {
            id: row.get(0)?,
            code: row.get(1)?,
            max_uses: row.get(2)?,
            current_uses: row.get(3)?,
            is_active: row.get::<_, i32>(4)? != 0,
            created_by: row.get(5)?,
            created_at: row.get(6)?,
            expires_at: row.get(7)?,
        })
    }
}

impl FromRow for CodeUsage {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(CodeUsage {
            id: row.get(0)?,
            invitation_code_id: row.get(1)?,
            user_id: row.get(2)?,
            used_at: row.get(3)?,
        })
    }
}

impl FromRow for ProductLicense {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ProductLicense {
            id: row.get(0)?,
            license_code: row.get(1)?,
            client_name: row.get(2)?,
            client_email: row.get(3)?,
            is_active: row.get::<_, i32>(4)? != 0,
            max_devices: row.get(5)?,
            created_at: row.get(6)?,
            expires_at: row.get(7)?,
            notes: row.get(8)?,
        })
    }
}

impl FromRow for LicenseDevice {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LicenseDevice {
            id: row.get(0)?,
            license_id: row.get(1)?,
            machine_id: row.get(2)?,
            device_name: row.get(3)?,
            first_activation: row.get(4)?,
            last_check: row.get(5)?,
        })
    }
}

impl FromRow for LicenseModule {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LicenseModule {
            id: row.get(0)?,
            license_id: row.get(1)?,
            module_name: row.get(2)?,
            added_at: row.get(3)?,
        })
    }
}

impl FromRow for Product {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            display_name: row.get(2)?,
            description: row.get(3)?,
            is_active: row.get::<_, i32>(4)? != 0,
            created_at: row.get(5)?,
        })
    }
}
