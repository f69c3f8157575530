use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params, types::Value};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    CODE_USAGE_COLS, DEVICE_COLS, FromRow, INVITATION_CODE_COLS, LICENSE_COLS, MODULE_COLS,
    PRODUCT_COLS, SESSION_COLS, USER_COLS, query_all, query_one,
};

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builder for UPDATE statements over a variable set of columns.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
        }
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    /// Some(v) sets v, None sets NULL.
    fn set_nullable<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        self.fields.push((column, value.map_or(Value::Null, Into::into)));
        self
    }

    fn statement(self, returning: Option<&str>) -> (String, Vec<Value>) {
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let mut sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, sets.join(", "));
        if let Some(cols) = returning {
            sql.push_str(" RETURNING ");
            sql.push_str(cols);
        }
        (sql, values)
    }

    fn execute(self, conn: &Connection) -> Result<bool> {
        if self.fields.is_empty() {
            return Ok(false);
        }
        let (sql, values) = self.statement(None);
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(affected > 0)
    }

    /// Returns None if no row matched.
    fn execute_returning<T: FromRow>(self, conn: &Connection, returning_cols: &str) -> Result<Option<T>> {
        if self.fields.is_empty() {
            return Ok(None);
        }
        let (sql, values) = self.statement(Some(returning_cols));
        conn.query_row(&sql, rusqlite::params_from_iter(values), T::from_row)
            .optional()
            .map_err(Into::into)
    }
}

// ============ Users ============

pub fn create_user(conn: &Connection, input: &NewUser, now: i64) -> Result<User> {
    let id = gen_id();
    conn.execute(
        "INSERT INTO users (id, email, password_hash, full_name, company, phone, is_active, is_admin, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)",
        params![
            &id,
            input.email,
            input.password_hash,
            input.full_name,
            input.company,
            input.phone,
            input.is_admin as i32,
            now
        ],
    )?;

    Ok(User {
        id,
        email: input.email.to_string(),
        password_hash: input.password_hash.to_string(),
        full_name: input.full_name.to_string(),
        company: input.company.map(String::from),
        phone: input.phone.map(String::from),
        is_active: true,
        is_admin: input.is_admin,
        created_at: now,
    })
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

/// `email` must already be normalized.
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&email],
    )
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        params![email],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Newest first.
pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    query_all(
        conn,
        &format!("SELECT {} FROM users ORDER BY created_at DESC, id", USER_COLS),
        &[],
    )
}

pub fn set_user_active(conn: &Connection, id: &str, is_active: bool) -> Result<bool> {
    UpdateBuilder::new("users", id)
        .set("is_active", is_active as i32)
        .execute(conn)
}

pub fn set_user_admin(conn: &Connection, id: &str, is_admin: bool) -> Result<bool> {
    UpdateBuilder::new("users", id)
        .set("is_admin", is_admin as i32)
        .execute(conn)
}

// ============ Sessions ============

pub fn create_session(
    conn: &Connection,
    user_id: &str,
    token_hash: &str,
    ip_address: Option<&str>,
    now: i64,
    expires_at: i64,
) -> Result<Session> {
    let id = gen_id();
    conn.execute(
        "INSERT INTO sessions (id, user_id, token_hash, ip_address, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![&id, user_id, token_hash, ip_address, now, expires_at],
    )?;

    Ok(Session {
        id,
        user_id: user_id.to_string(),
        token_hash: token_hash.to_string(),
        ip_address: ip_address.map(String::from),
        created_at: now,
        expires_at,
    })
}

pub fn list_sessions_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Session>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM sessions WHERE user_id = ?1 ORDER BY created_at DESC",
            SESSION_COLS
        ),
        &[&user_id],
    )
}

// ============ Invitation Codes ============

pub fn create_invitation_code(
    conn: &Connection,
    code: &str,
    max_uses: i32,
    created_by: Option<&str>,
    now: i64,
    expires_at: Option<i64>,
) -> Result<InvitationCode> {
    let id = gen_id();
    conn.execute(
        "INSERT INTO invitation_codes (id, code, max_uses, current_uses, is_active, created_by, created_at, expires_at)
         VALUES (?1, ?2, ?3, 0, 1, ?4, ?5, ?6)",
        params![&id, code, max_uses, created_by, now, expires_at],
    )?;

    Ok(InvitationCode {
        id,
        code: code.to_string(),
        max_uses,
        current_uses: 0,
        is_active: true,
        created_by: created_by.map(String::from),
        created_at: now,
        expires_at,
    })
}

pub fn get_invitation_code_by_id(conn: &Connection, id: &str) -> Result<Option<InvitationCode>> {
    query_one(
        conn,
        &format!("SELECT {} FROM invitation_codes WHERE id = ?1", INVITATION_CODE_COLS),
        &[&id],
    )
}

pub fn get_invitation_code_by_code(conn: &Connection, code: &str) -> Result<Option<InvitationCode>> {
    query_one(
        conn,
        &format!("SELECT {} FROM invitation_codes WHERE code = ?1", INVITATION_CODE_COLS),
        &[&code],
    )
}

/// Newest first.
pub fn list_invitation_codes(conn: &Connection) -> Result<Vec<InvitationCode>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM invitation_codes ORDER BY created_at DESC, id",
            INVITATION_CODE_COLS
        ),
        &[],
    )
}

pub fn set_invitation_code_active(conn: &Connection, id: &str, is_active: bool) -> Result<bool> {
    UpdateBuilder::new("invitation_codes", id)
        .set("is_active", is_active as i32)
        .execute(conn)
}

/// Atomically consume one use of an active code.
///
/// Returns false if the code is inactive or already at `max_uses`; the
/// counter is never incremented past the limit.
pub fn try_redeem_invitation_code(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE invitation_codes SET current_uses = current_uses + 1
         WHERE id = ?1 AND is_active = 1 AND current_uses < max_uses",
        params![id],
    )?;
    Ok(affected > 0)
}

pub fn record_code_usage(conn: &Connection, code_id: &str, user_id: &str, now: i64) -> Result<CodeUsage> {
    let id = gen_id();
    conn.execute(
        "INSERT INTO code_usage (id, invitation_code_id, user_id, used_at) VALUES (?1, ?2, ?3, ?4)",
        params![&id, code_id, user_id, now],
    )?;

    Ok(CodeUsage {
        id,
        invitation_code_id: code_id.to_string(),
        user_id: user_id.to_string(),
        used_at: now,
    })
}

pub fn list_code_usage(conn: &Connection, code_id: &str) -> Result<Vec<CodeUsage>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM code_usage WHERE invitation_code_id = ?1 ORDER BY used_at",
            CODE_USAGE_COLS
        ),
        &[&code_id],
    )
}

// ============ Product Licenses ============

pub fn create_license(
    conn: &Connection,
    license_code: &str,
    input: &NewLicense,
    now: i64,
) -> Result<ProductLicense> {
    let id = gen_id();
    conn.execute(
        "INSERT INTO product_licenses (id, license_code, client_name, client_email, is_active, max_devices, created_at, expires_at, notes)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?7, ?8)",
        params![
            &id,
            license_code,
            input.client_name,
            input.client_email,
            input.max_devices,
            now,
            input.expires_at,
            input.notes
        ],
    )?;

    Ok(ProductLicense {
        id,
        license_code: license_code.to_string(),
        client_name: input.client_name.to_string(),
        client_email: input.client_email.to_string(),
        is_active: true,
        max_devices: input.max_devices,
        created_at: now,
        expires_at: input.expires_at,
        notes: input.notes.to_string(),
    })
}

pub fn get_license_by_id(conn: &Connection, id: &str) -> Result<Option<ProductLicense>> {
    query_one(
        conn,
        &format!("SELECT {} FROM product_licenses WHERE id = ?1", LICENSE_COLS),
        &[&id],
    )
}

pub fn get_license_by_code(conn: &Connection, license_code: &str) -> Result<Option<ProductLicense>> {
    query_one(
        conn,
        &format!("SELECT {} FROM product_licenses WHERE license_code = ?1", LICENSE_COLS),
        &[&license_code],
    )
}

/// All licenses, newest first, with device counts and module names
/// computed at read time.
pub fn list_licenses_with_details(conn: &Connection) -> Result<Vec<LicenseWithDetails>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, (SELECT COUNT(*) FROM license_devices d WHERE d.license_id = l.id)
         FROM product_licenses l ORDER BY l.created_at DESC, l.id",
        LICENSE_COLS
            .split(", ")
            .map(|c| format!("l.{}", c))
            .collect::<Vec<_>>()
            .join(", ")
    ))?;
    let licenses = stmt
        .query_map([], |row| {
            Ok((ProductLicense::from_row(row)?, row.get::<_, i64>(9)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut modules: HashMap<String, Vec<String>> = HashMap::new();
    let mut stmt = conn.prepare("SELECT license_id, module_name FROM license_modules ORDER BY module_name")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    for row in rows {
        let (license_id, name) = row?;
        modules.entry(license_id).or_default().push(name);
    }

    Ok(licenses
        .into_iter()
        .map(|(license, device_count)| {
            let modules = modules.remove(&license.id).unwrap_or_default();
            LicenseWithDetails {
                license,
                device_count,
                modules,
            }
        })
        .collect())
}

/// Replace the editable fields. Returns None if the license does not exist.
pub fn update_license(
    conn: &Connection,
    id: &str,
    input: &NewLicense,
    is_active: bool,
) -> Result<Option<ProductLicense>> {
    UpdateBuilder::new("product_licenses", id)
        .set("client_name", input.client_name.to_string())
        .set("client_email", input.client_email.to_string())
        .set("max_devices", input.max_devices)
        .set_nullable("expires_at", input.expires_at)
        .set("notes", input.notes.to_string())
        .set("is_active", is_active as i32)
        .execute_returning(conn, LICENSE_COLS)
}

pub fn set_license_active(conn: &Connection, id: &str, is_active: bool) -> Result<bool> {
    UpdateBuilder::new("product_licenses", id)
        .set("is_active", is_active as i32)
        .execute(conn)
}

/// Delete a license together with its modules and devices in one transaction.
pub fn delete_license(conn: &mut Connection, id: &str) -> Result<bool> {
    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
    tx.execute("DELETE FROM license_modules WHERE license_id = ?1", params![id])?;
    tx.execute("DELETE FROM license_devices WHERE license_id = ?1", params![id])?;
    let deleted = tx.execute("DELETE FROM product_licenses WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(deleted > 0)
}

// ============ License Modules ============

/// Insert a module grant. Returns false if the license already had it.
/// `module_name` must already be normalized.
pub fn add_license_module(conn: &Connection, license_id: &str, module_name: &str, now: i64) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO license_modules (id, license_id, module_name, added_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![gen_id(), license_id, module_name, now],
    )?;
    Ok(inserted > 0)
}

pub fn list_license_modules(conn: &Connection, license_id: &str) -> Result<Vec<LicenseModule>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM license_modules WHERE license_id = ?1 ORDER BY module_name",
            MODULE_COLS
        ),
        &[&license_id],
    )
}

pub fn get_license_module(conn: &Connection, license_id: &str, module_name: &str) -> Result<Option<LicenseModule>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM license_modules WHERE license_id = ?1 AND module_name = ?2",
            MODULE_COLS
        ),
        &[&license_id, &module_name],
    )
}

pub fn license_module_names(conn: &Connection, license_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT module_name FROM license_modules WHERE license_id = ?1 ORDER BY module_name")?;
    let names = stmt
        .query_map(params![license_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}

pub fn has_module(conn: &Connection, license_id: &str, module_name: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM license_modules WHERE license_id = ?1 AND module_name = ?2)",
        params![license_id, module_name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Remove a module record belonging to `license_id`.
pub fn delete_license_module(conn: &Connection, license_id: &str, module_id: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM license_modules WHERE id = ?1 AND license_id = ?2",
        params![module_id, license_id],
    )?;
    Ok(deleted > 0)
}

// ============ License Devices ============

pub fn find_device(conn: &Connection, license_id: &str, machine_id: &str) -> Result<Option<LicenseDevice>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM license_devices WHERE license_id = ?1 AND machine_id = ?2",
            DEVICE_COLS
        ),
        &[&license_id, &machine_id],
    )
}

pub fn count_devices(conn: &Connection, license_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM license_devices WHERE license_id = ?1",
        params![license_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn create_device(
    conn: &Connection,
    license_id: &str,
    machine_id: &str,
    device_name: Option<&str>,
    now: i64,
) -> Result<LicenseDevice> {
    let id = gen_id();
    conn.execute(
        "INSERT INTO license_devices (id, license_id, machine_id, device_name, first_activation, last_check)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![&id, license_id, machine_id, device_name, now],
    )?;

    Ok(LicenseDevice {
        id,
        license_id: license_id.to_string(),
        machine_id: machine_id.to_string(),
        device_name: device_name.map(String::from),
        first_activation: now,
        last_check: now,
    })
}

pub fn update_device_last_check(conn: &Connection, id: &str, now: i64) -> Result<bool> {
    UpdateBuilder::new("license_devices", id)
        .set("last_check", now)
        .execute(conn)
}

/// Newest first.
pub fn list_devices(conn: &Connection, license_id: &str) -> Result<Vec<LicenseDevice>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM license_devices WHERE license_id = ?1 ORDER BY first_activation DESC, id",
            DEVICE_COLS
        ),
        &[&license_id],
    )
}

/// Remove a device belonging to `license_id`, freeing its slot.
pub fn delete_device(conn: &Connection, license_id: &str, device_id: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM license_devices WHERE id = ?1 AND license_id = ?2",
        params![device_id, license_id],
    )?;
    Ok(deleted > 0)
}

/// Result of binding a machine to a license.
#[derive(Debug)]
pub enum DeviceAcquisitionResult {
    /// Machine was already bound; its `last_check` has been refreshed
    Existing(LicenseDevice),
    /// Machine was bound to a free slot
    Created(LicenseDevice),
    /// Every slot is taken; nothing was written
    LimitReached { max_devices: i32 },
    /// License row is gone
    LicenseMissing,
    LicenseInactive,
    LicenseExpired,
}

/// Look up or bind `machine_id` against the license's device quota.
///
/// Runs in an IMMEDIATE transaction so concurrent callers serialize on the
/// write lock and the quota cannot be exceeded. The license row is re-read
/// under that lock, so its active flag, expiry and `max_devices` are the
/// values current at bind time. A machine that is already bound is always
/// accepted, even if the quota has since been lowered.
pub fn acquire_device_atomic(
    conn: &mut Connection,
    license_id: &str,
    machine_id: &str,
    device_name: Option<&str>,
    now: i64,
) -> Result<DeviceAcquisitionResult> {
    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

    let Some(license) = get_license_by_id(&tx, license_id)? else {
        return Ok(DeviceAcquisitionResult::LicenseMissing);
    };
    if !license.is_active {
        return Ok(DeviceAcquisitionResult::LicenseInactive);
    }
    if license.is_expired(now) {
        return Ok(DeviceAcquisitionResult::LicenseExpired);
    }

    if let Some(device) = find_device(&tx, license_id, machine_id)? {
        update_device_last_check(&tx, &device.id, now)?;
        tx.commit()?;
        return Ok(DeviceAcquisitionResult::Existing(LicenseDevice {
            last_check: now,
            ..device
        }));
    }

    let current = count_devices(&tx, license_id)?;
    if current >= i64::from(license.max_devices) {
        return Ok(DeviceAcquisitionResult::LimitReached {
            max_devices: license.max_devices,
        });
    }

    let device = create_device(&tx, license_id, machine_id, device_name, now)?;
    tx.commit()?;
    Ok(DeviceAcquisitionResult::Created(device))
}

// ============ Products ============

/// Insert a catalog entry unless one with the same name exists.
pub fn upsert_product(
    conn: &Connection,
    name: &str,
    display_name: &str,
    description: &str,
    now: i64,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO products (id, name, display_name, description, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5)",
        params![gen_id(), name, display_name, description, now],
    )?;
    Ok(inserted > 0)
}

pub fn list_products(conn: &Connection) -> Result<Vec<Product>> {
    query_all(
        conn,
        &format!("SELECT {} FROM products ORDER BY name", PRODUCT_COLS),
        &[],
    )
}

pub fn get_product_by_name(conn: &Connection, name: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE name = ?1", PRODUCT_COLS),
        &[&name],
    )
}
