use axum::extract::State;

use super::DeleteResponse;
use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::LicenseDevice;

pub async fn list_devices(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
) -> Result<Json<Vec<LicenseDevice>>> {
    let conn = state.db.get()?;
    Ok(Json(state.licenses.list_devices(&conn, &license_id)?))
}

/// Unbinding frees the slot for a different machine.
pub async fn remove_device(
    State(state): State<AppState>,
    Path((license_id, device_id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let conn = state.db.get()?;
    state.licenses.remove_device(&conn, &license_id, &device_id)?;
    Ok(Json(DeleteResponse { deleted: true }))
}
