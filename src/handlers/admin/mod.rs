mod devices;
mod invitation_codes;
mod licenses;
mod modules;
mod products;
mod users;

pub use devices::*;
pub use invitation_codes::*;
pub use licenses::*;
pub use modules::*;
pub use products::*;
pub use users::*;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::db::AppState;
use crate::middleware::require_admin;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // Users
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}/status", put(update_user_status))
        .route("/api/admin/users/{id}/admin", put(set_user_admin))
        // Invitation codes
        .route("/api/admin/codes", get(list_codes).post(create_code))
        .route("/api/admin/codes/{id}/status", put(update_code_status))
        // Product licenses
        .route("/api/admin/product-licenses", get(list_licenses).post(issue_license))
        .route(
            "/api/admin/product-licenses/{id}",
            get(get_license).put(update_license).delete(delete_license),
        )
        .route("/api/admin/product-licenses/{id}/status", put(update_license_status))
        // Devices bound to a license
        .route("/api/admin/licenses/{id}/devices", get(list_devices))
        .route("/api/admin/licenses/{id}/devices/{device_id}", delete(remove_device))
        // Modules granted to a license
        .route("/api/admin/licenses/{id}/modules", get(list_modules).post(add_module))
        .route("/api/admin/licenses/{id}/modules/{module_id}", delete(remove_module))
        // Catalog
        .route("/api/admin/products", get(list_products))
        .layer(middleware::from_fn_with_state(state, require_admin))
}
