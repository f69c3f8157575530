use axum::extract::State;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::{SetUserAdmin, UpdateUserStatus, User};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let conn = state.db.get()?;
    Ok(Json(state.auth.list_users(&conn)?))
}

pub async fn update_user_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<UpdateUserStatus>,
) -> Result<Json<User>> {
    let conn = state.db.get()?;
    Ok(Json(state.auth.set_user_status(&conn, &user_id, input.is_active)?))
}

pub async fn set_user_admin(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<SetUserAdmin>,
) -> Result<Json<User>> {
    let conn = state.db.get()?;
    Ok(Json(state.auth.set_user_admin(&conn, &user_id, input.is_admin)?))
}
