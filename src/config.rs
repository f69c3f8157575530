use std::env;

use thiserror::Error;

use crate::jwt::MIN_SECRET_LEN;

const DEV_JWT_SECRET: &str = "keyward-development-secret-do-not-use-in-prod";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set outside dev mode")]
    MissingJwtSecret,

    #[error("JWT_SECRET must be at least {min} bytes, got {0}", min = MIN_SECRET_LEN)]
    WeakJwtSecret(usize),

    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub token_clock_skew_secs: u64,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    pub default_registration_module: Option<String>,
    pub dev_mode: bool,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("KEYWARD_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) => secret,
            None if dev_mode => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::MissingJwtSecret),
        };
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakJwtSecret(jwt_secret.len()));
        }

        Ok(Self {
            host: non_empty_var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            database_path: non_empty_var("DATABASE_PATH").unwrap_or_else(|| "keyward.db".to_string()),
            jwt_secret,
            token_clock_skew_secs: parse_var("TOKEN_CLOCK_SKEW_SECS", 60)?,
            bootstrap_admin_email: non_empty_var("BOOTSTRAP_ADMIN_EMAIL"),
            bootstrap_admin_password: non_empty_var("BOOTSTRAP_ADMIN_PASSWORD"),
            default_registration_module: non_empty_var("DEFAULT_REGISTRATION_MODULE"),
            dev_mode,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Both bootstrap variables, if set.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.bootstrap_admin_email, &self.bootstrap_admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}
