use axum::extract::State;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::models::Product;

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let conn = state.db.get()?;
    Ok(Json(state.licenses.list_products(&conn)?))
}
