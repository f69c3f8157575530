use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::util::client_ip;

/// Run a password-hashing call off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("spawn_blocking failed: {}", e)))?
}

/// POST /api/register - create an account with an invitation code
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let ip = client_ip(&headers);
    let response = run_blocking(move || {
        let mut conn = state.db.get()?;
        state.auth.register(&mut conn, &req, ip.as_deref())
    })
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let ip = client_ip(&headers);
    let response = run_blocking(move || {
        let conn = state.db.get()?;
        state.auth.login(&conn, &req, ip.as_deref())
    })
    .await?;
    Ok(Json(response))
}
