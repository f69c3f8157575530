use axum::extract::State;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::models::{VerifyLicenseRequest, VerifyLicenseResponse};

/// POST /api/verify-license
///
/// Always 200 for business outcomes; the body's `valid` flag and `message`
/// say whether the machine may run the product.
pub async fn verify_license(
    State(state): State<AppState>,
    Json(req): Json<VerifyLicenseRequest>,
) -> Result<Json<VerifyLicenseResponse>> {
    let mut conn = state.db.get()?;
    let response = state.verifier.verify(&mut conn, &req)?;
    Ok(Json(response))
}
