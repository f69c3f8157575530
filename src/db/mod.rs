pub mod from_row;
pub mod queries;
mod schema;
pub mod seed;

pub use schema::{configure_connection, init_db};

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::clock::Clock;
use crate::services::{AuthService, InvitationLedger, LicenseRegistry, LicenseVerifier};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub clock: Arc<dyn Clock>,
    pub auth: AuthService,
    pub invitations: InvitationLedger,
    pub licenses: LicenseRegistry,
    pub verifier: LicenseVerifier,
}

impl AppState {
    /// Wire the services around a pool and clock.
    pub fn new(db: DbPool, clock: Arc<dyn Clock>, auth: AuthService) -> Self {
        Self {
            db,
            invitations: InvitationLedger::new(clock.clone()),
            licenses: LicenseRegistry::new(clock.clone()),
            verifier: LicenseVerifier::new(clock.clone()),
            clock,
            auth,
        }
    }
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| configure_connection(conn));
    Pool::builder().max_size(10).build(manager)
}
