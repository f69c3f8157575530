pub mod account;
pub mod admin;
pub mod public;

use axum::Router;

use crate::db::AppState;

/// Every route, unlayered and without state applied.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .merge(account::router(state.clone()))
        .merge(admin::router(state))
}
