//! Startup seeding: the product catalog, an optional bootstrap admin, and
//! sample data for development.

use rusqlite::Connection;

use crate::crypto::{PasswordParams, generate_invitation_code, hash_password};
use crate::error::Result;
use crate::models::*;
use crate::services::insert_license_with_modules;

use super::queries;

/// What `seed_defaults` changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub products_created: usize,
    pub admin: AdminSeed,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum AdminSeed {
    #[default]
    NotConfigured,
    Created,
    /// Existing account was activated and/or promoted
    Promoted,
    Unchanged,
}

/// Idempotent startup seeding.
///
/// Inserts missing catalog products. With admin credentials, creates the
/// admin if absent, otherwise makes sure the existing account is active and
/// an admin. An existing password is never overwritten.
pub fn seed_defaults(
    conn: &Connection,
    admin: Option<(&str, &str)>,
    password_params: &PasswordParams,
    now: i64,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for (name, display_name, description) in DEFAULT_PRODUCTS {
        if queries::upsert_product(conn, name, display_name, description, now)? {
            report.products_created += 1;
        }
    }

    if let Some((email, password)) = admin {
        let email = normalize_email(email);
        report.admin = match queries::get_user_by_email(conn, &email)? {
            Some(user) if user.is_admin && user.is_active => AdminSeed::Unchanged,
            Some(user) => {
                queries::set_user_active(conn, &user.id, true)?;
                queries::set_user_admin(conn, &user.id, true)?;
                AdminSeed::Promoted
            }
            None => {
                let password_hash = hash_password(password, password_params)?;
                queries::create_user(
                    conn,
                    &NewUser {
                        email: &email,
                        password_hash: &password_hash,
                        full_name: "Administrator",
                        company: None,
                        phone: None,
                        is_admin: true,
                    },
                    now,
                )?;
                AdminSeed::Created
            }
        };
    }

    Ok(report)
}

/// Sample data for local development.
pub struct DevSeed {
    pub invitation_code: InvitationCode,
    pub license: ProductLicense,
}

/// Create one invitation code and one sample license. Skipped (returns
/// None) when any license already exists.
pub fn seed_dev_data(conn: &Connection, created_by: Option<&str>, now: i64) -> Result<Option<DevSeed>> {
    if !queries::list_licenses_with_details(conn)?.is_empty() {
        return Ok(None);
    }

    let invitation_code =
        queries::create_invitation_code(conn, &generate_invitation_code(), 10, created_by, now, None)?;

    let license = insert_license_with_modules(
        conn,
        &NewLicense {
            client_name: "Dev Client",
            client_email: "dev@keyward.local",
            max_devices: 2,
            expires_at: None,
            notes: "development sample",
        },
        &["CALCULADORA".to_string(), "VISOR".to_string()],
        now,
    )?;

    Ok(Some(DevSeed {
        invitation_code,
        license,
    }))
}
