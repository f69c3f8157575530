use std::sync::Arc;

use rusqlite::Connection;

use crate::clock::Clock;
use crate::crypto::generate_license_code;
use crate::db::queries;
use crate::error::{AppError, OptionExt, Result, msg};
use crate::models::*;
use crate::util::expiry_from_days;

/// Insert a license and grant each module (normalized, duplicates ignored).
/// Callers that need atomicity pass a transaction.
pub fn insert_license_with_modules(
    conn: &Connection,
    input: &NewLicense,
    modules: &[String],
    now: i64,
) -> Result<ProductLicense> {
    let license = queries::create_license(conn, &generate_license_code(), input, now)?;
    for module in modules {
        let name = normalize_module_name(module);
        if name.is_empty() {
            continue;
        }
        queries::add_license_module(conn, &license.id, &name, now)?;
    }
    Ok(license)
}

/// Admin operations on licenses, their modules and bound devices.
#[derive(Clone)]
pub struct LicenseRegistry {
    clock: Arc<dyn Clock>,
}

impl LicenseRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Issue a license with a fresh uppercase code. `max_devices` of zero
    /// becomes one; `days_valid` of zero or less means no expiry.
    pub fn issue(&self, conn: &mut Connection, input: &IssueLicense) -> Result<ProductLicense> {
        input.validate()?;
        let now = self.clock.now();
        let new = NewLicense {
            client_name: input.client_name.trim(),
            client_email: input.client_email.trim(),
            max_devices: effective_max_devices(input.max_devices),
            expires_at: expiry_from_days(now, input.days_valid),
            notes: &input.notes,
        };

        let tx = conn.transaction()?;
        let license = insert_license_with_modules(&tx, &new, &input.modules, now)?;
        tx.commit()?;

        tracing::info!(
            license_id = %license.id,
            max_devices = license.max_devices,
            modules = input.modules.len(),
            "License issued"
        );
        Ok(license)
    }

    pub fn get(&self, conn: &Connection, id: &str) -> Result<ProductLicense> {
        queries::get_license_by_id(conn, id)?.or_not_found(msg::LICENSE_NOT_FOUND)
    }

    pub fn list_with_details(&self, conn: &Connection) -> Result<Vec<LicenseWithDetails>> {
        queries::list_licenses_with_details(conn)
    }

    /// Replace the editable fields. Expiry is recomputed from now.
    pub fn update(&self, conn: &Connection, id: &str, input: &UpdateLicense) -> Result<ProductLicense> {
        input.validate()?;
        let now = self.clock.now();
        let new = NewLicense {
            client_name: input.client_name.trim(),
            client_email: input.client_email.trim(),
            max_devices: effective_max_devices(input.max_devices),
            expires_at: expiry_from_days(now, input.days_valid),
            notes: &input.notes,
        };
        queries::update_license(conn, id, &new, input.is_active)?.or_not_found(msg::LICENSE_NOT_FOUND)
    }

    pub fn set_status(&self, conn: &Connection, id: &str, is_active: bool) -> Result<ProductLicense> {
        if !queries::set_license_active(conn, id, is_active)? {
            return Err(AppError::NotFound(msg::LICENSE_NOT_FOUND.into()));
        }
        self.get(conn, id)
    }

    /// Delete a license with all of its modules and devices.
    pub fn delete(&self, conn: &mut Connection, id: &str) -> Result<()> {
        if !queries::delete_license(conn, id)? {
            return Err(AppError::NotFound(msg::LICENSE_NOT_FOUND.into()));
        }
        tracing::info!(license_id = %id, "License deleted");
        Ok(())
    }

    pub fn list_modules(&self, conn: &Connection, license_id: &str) -> Result<Vec<LicenseModule>> {
        self.get(conn, license_id)?;
        queries::list_license_modules(conn, license_id)
    }

    /// Grant a module. Adding one the license already has is a no-op that
    /// returns the existing record.
    pub fn add_module(&self, conn: &Connection, license_id: &str, module_name: &str) -> Result<LicenseModule> {
        let name = normalize_module_name(module_name);
        if name.is_empty() {
            return Err(AppError::BadRequest(msg::MODULE_NAME_EMPTY.into()));
        }
        self.get(conn, license_id)?;

        if queries::add_license_module(conn, license_id, &name, self.clock.now())? {
            tracing::debug!(license_id = %license_id, module = %name, "Module added");
        }
        queries::get_license_module(conn, license_id, &name)?
            .ok_or_else(|| AppError::Internal(format!("module {} missing after insert", name)))
    }

    pub fn remove_module(&self, conn: &Connection, license_id: &str, module_id: &str) -> Result<()> {
        if !queries::delete_license_module(conn, license_id, module_id)? {
            return Err(AppError::NotFound(msg::MODULE_NOT_FOUND.into()));
        }
        Ok(())
    }

    pub fn list_devices(&self, conn: &Connection, license_id: &str) -> Result<Vec<LicenseDevice>> {
        self.get(conn, license_id)?;
        queries::list_devices(conn, license_id)
    }

    /// Unbind a device, freeing its slot for another machine.
    pub fn remove_device(&self, conn: &Connection, license_id: &str, device_id: &str) -> Result<()> {
        if !queries::delete_device(conn, license_id, device_id)? {
            return Err(AppError::NotFound(msg::DEVICE_NOT_FOUND.into()));
        }
        tracing::info!(license_id = %license_id, device_id = %device_id, "Device removed");
        Ok(())
    }

    pub fn list_products(&self, conn: &Connection) -> Result<Vec<Product>> {
        queries::list_products(conn)
    }
}
