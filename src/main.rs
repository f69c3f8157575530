use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keyward::clock::{Clock, SystemClock};
use keyward::config::Config;
use keyward::crypto::PasswordParams;
use keyward::db::seed::{AdminSeed, seed_defaults, seed_dev_data};
use keyward::db::{AppState, create_pool, init_db, queries};
use keyward::handlers;
use keyward::jwt::TokenSigner;
use keyward::services::AuthService;

#[derive(Parser, Debug)]
#[command(name = "keyward")]
#[command(about = "Invitation-gated accounts and device-bound software licensing")]
struct Cli {
    /// Seed the database with a sample invitation code and license (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds sample data for local testing. Prints the secrets to stdout.
fn run_dev_seed(state: &AppState, admin_email: Option<&str>) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let admin_id = admin_email
        .and_then(|email| queries::get_user_by_email(&conn, &email.trim().to_lowercase()).ok().flatten())
        .map(|user| user.id);

    match seed_dev_data(&conn, admin_id.as_deref(), state.clock.now()).expect("Failed to seed dev data") {
        Some(seed) => {
            println!("============================================");
            println!("DEV DATA SEEDED");
            println!("Invitation code: {}", seed.invitation_code.code);
            println!("License code:    {}", seed.license.license_code);
            println!("============================================");
        }
        None => tracing::info!("Database already has licenses, skipping dev seed"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyward=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let signer = TokenSigner::new(config.jwt_secret.as_bytes(), config.token_clock_skew_secs)
        .expect("Failed to create token signer");
    let auth = AuthService::new(
        signer,
        PasswordParams::default(),
        clock.clone(),
        config.default_registration_module.clone(),
    );
    let state = AppState::new(db_pool, clock, auth);

    // Catalog and bootstrap admin (idempotent)
    {
        let conn = state.db.get().expect("Failed to get connection for seeding");
        let report = seed_defaults(
            &conn,
            config.bootstrap_admin(),
            state.auth.password_params(),
            state.clock.now(),
        )
        .expect("Failed to seed defaults");

        if report.products_created > 0 {
            tracing::info!("Seeded {} catalog products", report.products_created);
        }
        match report.admin {
            AdminSeed::NotConfigured => {}
            AdminSeed::Created => tracing::info!("Bootstrap admin created"),
            AdminSeed::Promoted => tracing::info!("Bootstrap admin activated as admin"),
            AdminSeed::Unchanged => tracing::info!("Bootstrap admin already present"),
        }
    }

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set KEYWARD_ENV=dev)");
        } else {
            run_dev_seed(&state, config.bootstrap_admin_email.as_deref());
        }
    }

    if let Some(module) = &config.default_registration_module {
        tracing::info!("New accounts will receive a license for {}", module);
    }

    let app = handlers::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Keyward server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
