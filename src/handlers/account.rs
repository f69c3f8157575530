use axum::{Extension, Router, extract::State, middleware, routing::get};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::middleware::{AuthContext, require_user};
use crate::models::User;

/// GET /api/profile - the caller's own account
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<User>> {
    let conn = state.db.get()?;
    let user = state.auth.get_profile(&conn, &ctx.user_id)?;
    Ok(Json(user))
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile))
        .layer(middleware::from_fn_with_state(state, require_user))
}
