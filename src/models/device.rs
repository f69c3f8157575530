use serde::{Deserialize, Serialize};

const LABEL_PREFIX_LEN: usize = 8;

/// A machine bound to a license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseDevice {
    pub id: String,
    pub license_id: String,
    pub machine_id: String,
    pub device_name: Option<String>,
    pub first_activation: i64,
    pub last_check: i64,
}

/// Label shown to admins for a newly bound machine: "Device-" followed by
/// the first eight characters of the machine id, or the whole id if shorter.
pub fn device_label(machine_id: &str) -> String {
    let prefix: String = machine_id.chars().take(LABEL_PREFIX_LEN).collect();
    format!("Device-{}", prefix)
}
