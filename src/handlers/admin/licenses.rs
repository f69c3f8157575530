use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::{IssueLicense, LicenseWithDetails, ProductLicense, SetLicenseStatus, UpdateLicense};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

pub async fn issue_license(
    State(state): State<AppState>,
    Json(input): Json<IssueLicense>,
) -> Result<(StatusCode, Json<ProductLicense>)> {
    let mut conn = state.db.get()?;
    let license = state.licenses.issue(&mut conn, &input)?;
    Ok((StatusCode::CREATED, Json(license)))
}

pub async fn list_licenses(State(state): State<AppState>) -> Result<Json<Vec<LicenseWithDetails>>> {
    let conn = state.db.get()?;
    Ok(Json(state.licenses.list_with_details(&conn)?))
}

pub async fn get_license(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductLicense>> {
    let conn = state.db.get()?;
    Ok(Json(state.licenses.get(&conn, &id)?))
}

pub async fn update_license(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateLicense>,
) -> Result<Json<ProductLicense>> {
    let conn = state.db.get()?;
    Ok(Json(state.licenses.update(&conn, &id, &input)?))
}

pub async fn update_license_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<SetLicenseStatus>,
) -> Result<Json<ProductLicense>> {
    let conn = state.db.get()?;
    Ok(Json(state.licenses.set_status(&conn, &id, input.is_active)?))
}

pub async fn delete_license(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut conn = state.db.get()?;
    state.licenses.delete(&mut conn, &id)?;
    Ok(Json(DeleteResponse { deleted: true }))
}
