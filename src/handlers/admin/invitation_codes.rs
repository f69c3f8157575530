use axum::{Extension, extract::State, http::StatusCode};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::middleware::AuthContext;
use crate::models::{CreateInvitationCode, InvitationCode, UpdateCodeStatus};

pub async fn create_code(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateInvitationCode>,
) -> Result<(StatusCode, Json<InvitationCode>)> {
    let conn = state.db.get()?;
    let code = state.invitations.create_code(&conn, Some(&ctx.user_id), &input)?;
    Ok((StatusCode::CREATED, Json(code)))
}

pub async fn list_codes(State(state): State<AppState>) -> Result<Json<Vec<InvitationCode>>> {
    let conn = state.db.get()?;
    Ok(Json(state.invitations.list_codes(&conn)?))
}

pub async fn update_code_status(
    State(state): State<AppState>,
    Path(code_id): Path<String>,
    Json(input): Json<UpdateCodeStatus>,
) -> Result<Json<InvitationCode>> {
    let conn = state.db.get()?;
    Ok(Json(state.invitations.set_status(&conn, &code_id, input.is_active)?))
}
