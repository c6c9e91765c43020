//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Deployment platform. Destructive admin endpoints only exist on `dev`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    Dev,
    #[default]
    Prod,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Chirper", about = "Short public posts with token authentication")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DATABASE", default_value = "chirper.db")]
    pub database: String,

    /// Deployment platform
    #[arg(long, env = "PLATFORM", default_value = "prod")]
    pub platform: Platform,

    /// Directory of static files served under /app
    #[arg(long, env = "FILEPATH_ROOT", default_value = ".")]
    pub filepath_root: PathBuf,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Path to file containing the payment partner API key. Prefer using POLKA_KEY env var instead
    #[arg(long)]
    pub polka_key_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Read a secret from an environment variable, falling back to a file.
/// The environment variable is cleared once read.
fn load_secret(env_var: &str, file: Option<&str>, flag: &str) -> Option<String> {
    if let Ok(secret) = std::env::var(env_var) {
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(env_var) };
        return Some(secret);
    }

    let Some(path) = file else {
        error!(
            "{} is required. Set the environment variable (recommended) or use {}",
            env_var, flag
        );
        return None;
    };

    match std::fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to read secret file");
            None
        }
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = load_secret("JWT_SECRET", jwt_secret_file, "--jwt-secret-file")?;

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Load the payment partner API key from environment variable or file.
pub fn load_polka_key(polka_key_file: Option<&str>) -> Option<String> {
    let key = load_secret("POLKA_KEY", polka_key_file, "--polka-key-file")?;

    if key.is_empty() {
        error!("POLKA_KEY must not be empty");
        return None;
    }

    Some(key)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    polka_key: String,
    platform: Platform,
    filepath_root: PathBuf,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        polka_key,
        platform,
        filepath_root,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_explicit() {
        let args = Args::try_parse_from([
            "chirper",
            "--platform",
            "dev",
            "-p",
            "9000",
            "-d",
            "test.db",
            "--log-format",
            "json",
            "--filepath-root",
            "public",
        ])
        .unwrap();
        assert_eq!(args.platform, Platform::Dev);
        assert_eq!(args.port, 9000);
        assert_eq!(args.database, "test.db");
        assert!(matches!(args.log_format, LogFormat::Json));
        assert_eq!(args.filepath_root, PathBuf::from("public"));
    }

    #[test]
    fn test_secret_file_is_trimmed() {
        let path = std::env::temp_dir().join(format!("chirper-secret-{}", uuid::Uuid::new_v4()));
        std::fs::write(&path, "partner-key\n").unwrap();

        let key = load_secret("CHIRPER_TEST_UNSET_SECRET", path.to_str(), "--x");
        assert_eq!(key.as_deref(), Some("partner-key"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_secret_file() {
        assert!(load_secret("CHIRPER_TEST_UNSET_SECRET", Some("/nonexistent/chirper"), "--x").is_none());
        assert!(load_secret("CHIRPER_TEST_UNSET_SECRET", None, "--x").is_none());
    }
}
