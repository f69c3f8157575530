use std::sync::Arc;

use rusqlite::Connection;

use crate::clock::Clock;
use crate::db::queries::{self, DeviceAcquisitionResult};
use crate::error::Result;
use crate::models::*;
use crate::util::days_remaining;

pub const MSG_MACHINE_ID_REQUIRED: &str = "machine id is required";
pub const MSG_NOT_FOUND: &str = "license not found";
pub const MSG_INACTIVE: &str = "license inactive";
pub const MSG_EXPIRED: &str = "license expired";
pub const MSG_VALID: &str = "license valid";

/// Client-facing license check.
///
/// Gates run cheapest first and stop at the first failure:
/// lookup, active flag, expiry, module entitlement, device slot. Only the
/// last gate writes. Every business failure is returned as
/// `valid: false`; only storage errors come back as `Err`.
#[derive(Clone)]
pub struct LicenseVerifier {
    clock: Arc<dyn Clock>,
}

impl LicenseVerifier {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn verify(&self, conn: &mut Connection, req: &VerifyLicenseRequest) -> Result<VerifyLicenseResponse> {
        let machine_id = req.machine_id.trim();
        if machine_id.is_empty() {
            return Ok(VerifyLicenseResponse::rejected(MSG_MACHINE_ID_REQUIRED));
        }

        let Some(license) = queries::get_license_by_code(conn, req.license_code.trim())? else {
            tracing::debug!("Verification rejected: unknown license code");
            return Ok(VerifyLicenseResponse::rejected(MSG_NOT_FOUND));
        };

        if !license.is_active {
            return Ok(VerifyLicenseResponse::rejected(MSG_INACTIVE));
        }

        let now = self.clock.now();
        if license.is_expired(now) {
            return Ok(VerifyLicenseResponse::rejected(MSG_EXPIRED));
        }

        let product = normalize_module_name(&req.product_name);
        if !queries::has_module(conn, &license.id, &product)? {
            tracing::debug!(license_id = %license.id, product = %product, "Verification rejected: no entitlement");
            return Ok(VerifyLicenseResponse::rejected(format!("no access to {}", product)));
        }

        let label = device_label(machine_id);
        match queries::acquire_device_atomic(conn, &license.id, machine_id, Some(&label), now)? {
            DeviceAcquisitionResult::Existing(device) => {
                tracing::debug!(license_id = %license.id, device_id = %device.id, "Known device checked in");
            }
            DeviceAcquisitionResult::Created(device) => {
                tracing::info!(license_id = %license.id, device_id = %device.id, "Device bound");
            }
            DeviceAcquisitionResult::LimitReached { max_devices } => {
                tracing::info!(license_id = %license.id, max_devices, "Device limit reached");
                return Ok(VerifyLicenseResponse::rejected(format!(
                    "device limit reached ({} max)",
                    max_devices
                )));
            }
            // License changed between the gates above and the device lock.
            DeviceAcquisitionResult::LicenseMissing => {
                return Ok(VerifyLicenseResponse::rejected(MSG_NOT_FOUND));
            }
            DeviceAcquisitionResult::LicenseInactive => {
                return Ok(VerifyLicenseResponse::rejected(MSG_INACTIVE));
            }
            DeviceAcquisitionResult::LicenseExpired => {
                return Ok(VerifyLicenseResponse::rejected(MSG_EXPIRED));
            }
        }

        let modules = queries::license_module_names(conn, &license.id)?;
        Ok(VerifyLicenseResponse {
            valid: true,
            message: MSG_VALID.to_string(),
            client_name: Some(license.client_name),
            expires_at: license.expires_at,
            days_remaining: Some(days_remaining(now, license.expires_at)),
            modules: Some(modules),
        })
    }
}
