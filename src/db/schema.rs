use rusqlite::Connection;

/// Per-connection settings. Applied by the pool to every new connection.
pub fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        "#,
    )
}

/// Initialize the database schema. Safe to run on every startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    configure_connection(conn)?;
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;

        -- Accounts. Emails are stored trimmed and lower-cased.
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name TEXT NOT NULL,
            company TEXT,
            phone TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_admin INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        -- One row per issued token; only the token hash is kept
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token_hash TEXT NOT NULL UNIQUE,
            ip_address TEXT,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

        -- Invitation codes gate registration
        CREATE TABLE IF NOT EXISTS invitation_codes (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            max_uses INTEGER NOT NULL DEFAULT 1,
            current_uses INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            expires_at INTEGER,
            CHECK (current_uses <= max_uses)
        );

        CREATE TABLE IF NOT EXISTS code_usage (
            id TEXT PRIMARY KEY,
            invitation_code_id TEXT NOT NULL REFERENCES invitation_codes(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            used_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_code_usage_code ON code_usage(invitation_code_id);

        -- Product licenses sold to clients
        CREATE TABLE IF NOT EXISTS product_licenses (
            id TEXT PRIMARY KEY,
            license_code TEXT NOT NULL UNIQUE,
            client_name TEXT NOT NULL,
            client_email TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            max_devices INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            expires_at INTEGER,
            notes TEXT NOT NULL DEFAULT ''
        );

        -- Machines bound to a license (one row per license/machine pair)
        CREATE TABLE IF NOT EXISTS license_devices (
            id TEXT PRIMARY KEY,
            license_id TEXT NOT NULL REFERENCES product_licenses(id) ON DELETE CASCADE,
            machine_id TEXT NOT NULL,
            device_name TEXT,
            first_activation INTEGER NOT NULL,
            last_check INTEGER NOT NULL,
            UNIQUE(license_id, machine_id)
        );
        CREATE INDEX IF NOT EXISTS idx_license_devices_license ON license_devices(license_id);

        -- Modules a license grants access to
        CREATE TABLE IF NOT EXISTS license_modules (
            id TEXT PRIMARY KEY,
            license_id TEXT NOT NULL REFERENCES product_licenses(id) ON DELETE CASCADE,
            module_name TEXT NOT NULL,
            added_at INTEGER NOT NULL,
            UNIQUE(license_id, module_name)
        );

        -- Product catalog (reference data)
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        );
        "#,
    )
}
