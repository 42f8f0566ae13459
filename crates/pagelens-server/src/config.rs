use std::time::Duration;

use pagelens_core::AppError;

/// Server configuration.
///
/// Model credentials are deliberately absent: every caller supplies its own
/// API key with each request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub fetch_timeout: Duration,
    pub model_timeout: Duration,
    pub max_retries: u32,
    pub allow_private_urls: bool,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            fetch_timeout: Duration::from_secs(30),
            model_timeout: Duration::from_secs(120),
            max_retries: 2,
            allow_private_urls: false,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `PAGELENS_PORT` (default 3000)
    /// - `PAGELENS_FETCH_TIMEOUT_SECS` (default 30)
    /// - `PAGELENS_MODEL_TIMEOUT_SECS` (default 120)
    /// - `PAGELENS_MAX_RETRIES` (default 2)
    /// - `PAGELENS_ALLOW_PRIVATE_URLS` (default false)
    /// - `PAGELENS_MAX_BODY_BYTES` (default 65536)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let port = parse_or(&lookup, "PAGELENS_PORT", defaults.port)?;
        let fetch_secs: u64 = parse_or(
            &lookup,
            "PAGELENS_FETCH_TIMEOUT_SECS",
            defaults.fetch_timeout.as_secs(),
        )?;
        let model_secs: u64 = parse_or(
            &lookup,
            "PAGELENS_MODEL_TIMEOUT_SECS",
            defaults.model_timeout.as_secs(),
        )?;
        if fetch_secs == 0 || model_secs == 0 {
            return Err(AppError::ConfigError(
                "Timeouts must be at least 1 second".into(),
            ));
        }

        Ok(Self {
            port,
            fetch_timeout: Duration::from_secs(fetch_secs),
            model_timeout: Duration::from_secs(model_secs),
            max_retries: parse_or(&lookup, "PAGELENS_MAX_RETRIES", defaults.max_retries)?,
            allow_private_urls: parse_or(
                &lookup,
                "PAGELENS_ALLOW_PRIVATE_URLS",
                defaults.allow_private_urls,
            )?,
            max_body_bytes: parse_or(&lookup, "PAGELENS_MAX_BODY_BYTES", defaults.max_body_bytes)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::ConfigError(format!("Invalid {key} '{raw}'"))
        }),
    }
}
