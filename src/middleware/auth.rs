use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::util::extract_bearer_token;

/// Caller identity, inserted into request extensions by the auth layers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
}

/// Validate the bearer token and confirm the account is still active.
///
/// Admin rights need both the token claim and the stored flag, so a
/// demotion takes effect before the token expires.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthContext> {
    let token = extract_bearer_token(headers).ok_or(AppError::Unauthorized)?;
    let session = state.auth.validate_token(token)?;

    let conn = state.db.get()?;
    let user = queries::get_user_by_id(&conn, &session.user_id)?.ok_or(AppError::Unauthorized)?;
    if !user.is_active {
        tracing::debug!(user_id = %user.id, "Token presented for disabled account");
        return Err(AppError::Unauthorized);
    }

    Ok(AuthContext {
        user_id: session.user_id,
        email: session.email,
        is_admin: session.is_admin && user.is_admin,
    })
}

pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let ctx = authenticate(&state, request.headers())?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Like `require_user`, but the caller must still be an admin.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let ctx = authenticate(&state, request.headers())?;
    if !ctx.is_admin {
        return Err(AppError::Forbidden("Admin access required".into()));
    }
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
