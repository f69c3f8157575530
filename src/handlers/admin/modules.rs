use axum::extract::State;

use super::DeleteResponse;
use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::{AddModule, LicenseModule};

pub async fn list_modules(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
) -> Result<Json<Vec<LicenseModule>>> {
    let conn = state.db.get()?;
    Ok(Json(state.licenses.list_modules(&conn, &license_id)?))
}

/// Idempotent: re-adding an existing module returns the existing record.
pub async fn add_module(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
    Json(input): Json<AddModule>,
) -> Result<Json<LicenseModule>> {
    let conn = state.db.get()?;
    Ok(Json(state.licenses.add_module(&conn, &license_id, &input.module_name)?))
}

pub async fn remove_module(
    State(state): State<AppState>,
    Path((license_id, module_id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let conn = state.db.get()?;
    state.licenses.remove_module(&conn, &license_id, &module_id)?;
    Ok(Json(DeleteResponse { deleted: true }))
}
