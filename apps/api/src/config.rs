use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup aborts if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on each model repair call.
    pub repair_timeout: Duration,
    /// Lift fields out of an `extracted_resume` wrapper before assembly.
    pub accept_resume_envelope: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            repair_timeout: Duration::from_secs(
                std::env::var("REPAIR_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse::<u64>()
                    .context("REPAIR_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            accept_resume_envelope: parse_flag(
                "ACCEPT_RESUME_ENVELOPE",
                std::env::var("ACCEPT_RESUME_ENVELOPE").ok().as_deref(),
                true,
            )?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(key: &str, raw: Option<&str>, default: bool) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(anyhow::anyhow!("{key} must be true or false, got '{other}'")),
    }
}
