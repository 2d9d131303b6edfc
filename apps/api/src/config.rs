use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a development default, so the server boots with no env at all.
///
/// The config is constructed once in `main` and passed into the components that
/// need it; nothing reads the environment after startup, so tests can build a
/// `Config` pointing at a temporary directory and database.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub cors_origins: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: env_or("DATABASE_URL", "sqlite:portfolio.db?mode=rwc"),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads/resumes")),
            cors_origins: env_or(
                "CORS_ORIGINS",
                "http://localhost:3000,http://127.0.0.1:3000",
            ),
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Parses the comma-separated `CORS_ORIGINS` value. `"*"` means any origin.
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn allow_any_origin(&self) -> bool {
        self.cors_origins.trim() == "*"
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
