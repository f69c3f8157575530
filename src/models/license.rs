use serde::{Deserialize, Serialize, Serializer};

use crate::error::{AppError, Result, msg};

/// Trimmed, uppercase module/product name. Both issuance and verification
/// compare names in this form.
pub fn normalize_module_name(name: &str) -> String {
    name.trim().to_uppercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLicense {
    pub id: String,
    pub license_code: String,
    pub client_name: String,
    pub client_email: String,
    pub is_active: bool,
    pub max_devices: i32,
    pub created_at: i64,
    /// None = never expires
    pub expires_at: Option<i64>,
    pub notes: String,
}

impl ProductLicense {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

/// Normalized fields for an insert or full update.
#[derive(Debug)]
pub struct NewLicense<'a> {
    pub client_name: &'a str,
    pub client_email: &'a str,
    pub max_devices: i32,
    pub expires_at: Option<i64>,
    pub notes: &'a str,
}

/// License annotated with live counts for admin listings.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseWithDetails {
    #[serde(flatten)]
    pub license: ProductLicense,
    pub device_count: i64,
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseModule {
    pub id: String,
    pub license_id: String,
    pub module_name: String,
    pub added_at: i64,
}

fn validate_license_fields(client_name: &str, max_devices: i32) -> Result<()> {
    if client_name.trim().is_empty() {
        return Err(AppError::BadRequest(msg::CLIENT_NAME_EMPTY.into()));
    }
    if max_devices < 0 {
        return Err(AppError::BadRequest(msg::MAX_DEVICES_INVALID.into()));
    }
    Ok(())
}

/// Zero means "use the default of one device".
pub fn effective_max_devices(requested: i32) -> i32 {
    if requested == 0 { 1 } else { requested }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueLicense {
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub max_devices: i32,
    /// Zero or negative means no expiry.
    #[serde(default)]
    pub days_valid: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub modules: Vec<String>,
}

impl IssueLicense {
    pub fn validate(&self) -> Result<()> {
        validate_license_fields(&self.client_name, self.max_devices)
    }
}

/// Full replacement of a license's editable fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLicense {
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub max_devices: i32,
    #[serde(default)]
    pub days_valid: i64,
    #[serde(default)]
    pub notes: String,
    pub is_active: bool,
}

impl UpdateLicense {
    pub fn validate(&self) -> Result<()> {
        validate_license_fields(&self.client_name, self.max_devices)
    }
}

#[derive(Debug, Deserialize)]
pub struct SetLicenseStatus {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddModule {
    pub module_name: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyLicenseRequest {
    pub license_code: String,
    pub machine_id: String,
    pub product_name: String,
}

/// Whole days until expiry, or no limit for a non-expiring license.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysRemaining {
    Days(i64),
    NoLimit,
}

impl Serialize for DaysRemaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DaysRemaining::Days(days) => serializer.serialize_i64(*days),
            DaysRemaining::NoLimit => serializer.serialize_str("no limit"),
        }
    }
}

/// Outcome of a verification call. Gate failures are `valid: false` with a
/// message; the optional fields are only present on success.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyLicenseResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<DaysRemaining>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,
}

impl VerifyLicenseResponse {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            client_name: None,
            expires_at: None,
            days_remaining: None,
            modules: None,
        }
    }
}
