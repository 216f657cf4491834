//! Configuration module
//!
//! All settings come from the environment (optionally seeded from a `.env`
//! file). The configuration is validated once at startup and then shared
//! read-only; changing it requires a restart.

use std::collections::HashSet;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};

use crate::constants::{DEFAULT_BOT_NAME, DEFAULT_DEVICE_ID};
use crate::retry::RetryPolicy;

const FETCH_TIMEOUT_SECS: u64 = 600;
const UPLOAD_TIMEOUT_SECS: u64 = 600;
const UPLOAD_MAX_ATTEMPTS: u32 = 3;
const UPLOAD_RETRY_BASE_MS: u64 = 1000;
const UPLOAD_RETRY_MAX_MS: u64 = 30_000;

/// Log verbosity accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(anyhow!(
                "LOG_LEVEL must be one of DEBUG, INFO, WARNING, ERROR (got '{}')",
                other
            )),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("LOG_FORMAT must be 'text' or 'json' (got '{}')", other)),
        }
    }
}

/// Self-hosted Bot API server. Only exists when all three variables are set.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalEndpoint {
    pub api_id: String,
    pub api_hash: String,
    pub base_url: String,
}

impl fmt::Debug for LocalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEndpoint")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Validated process configuration.
#[derive(Clone)]
pub struct Config {
    bot_token: String,
    immich_api_url: String,
    immich_api_key: String,
    allowed_user_ids: HashSet<i64>,
    local_endpoint: Option<LocalEndpoint>,
    log_level: LogLevel,
    log_format: LogFormat,
    bot_name: String,
    device_id: String,
    fetch_timeout: Duration,
    upload_timeout: Duration,
    retry_policy: RetryPolicy,
    temp_dir: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("immich_api_url", &self.immich_api_url)
            .field("immich_api_key", &"<redacted>")
            .field("allowed_user_ids", &self.allowed_user_ids)
            .field("local_endpoint", &self.local_endpoint)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("bot_name", &self.bot_name)
            .field("device_id", &self.device_id)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("upload_timeout", &self.upload_timeout)
            .field("retry_policy", &self.retry_policy)
            .field("temp_dir", &self.temp_dir)
            .finish()
    }
}

impl Config {
    /// Load from the process environment. A `.env` file in the working
    /// directory is read first when present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();
        let bot_token = get("TELEGRAM_BOT_TOKEN");
        let immich_api_url = get("IMMICH_API_URL");
        let immich_api_key = get("IMMICH_API_KEY");
        let allowed_raw = get("ALLOWED_USER_IDS");
        for (name, value) in [
            ("TELEGRAM_BOT_TOKEN", &bot_token),
            ("IMMICH_API_KEY", &immich_api_key),
            ("IMMICH_API_URL", &immich_api_url),
            ("ALLOWED_USER_IDS", &allowed_raw),
        ] {
            if value.is_none() {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            return Err(anyhow!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        let allowed_user_ids = parse_user_ids(allowed_raw.as_deref().unwrap_or_default())?;

        let local_endpoint = match (
            get("TELEGRAM_API_ID"),
            get("TELEGRAM_API_HASH"),
            get("TELEGRAM_API_URL"),
        ) {
            (Some(api_id), Some(api_hash), Some(base_url)) => Some(LocalEndpoint {
                api_id,
                api_hash,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
            (None, None, None) => None,
            _ => {
                return Err(anyhow!(
                    "TELEGRAM_API_ID, TELEGRAM_API_HASH and TELEGRAM_API_URL must be set together"
                ))
            }
        };

        let log_level = get("LOG_LEVEL")
            .map(|s| s.parse::<LogLevel>())
            .transpose()?
            .unwrap_or_default();
        let log_format = get("LOG_FORMAT")
            .map(|s| s.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let fetch_timeout_secs = parse_or(
            "FETCH_TIMEOUT_SECS",
            get("FETCH_TIMEOUT_SECS"),
            FETCH_TIMEOUT_SECS,
        )?;
        let upload_timeout_secs = parse_or(
            "UPLOAD_TIMEOUT_SECS",
            get("UPLOAD_TIMEOUT_SECS"),
            UPLOAD_TIMEOUT_SECS,
        )?;
        let max_attempts = parse_or(
            "UPLOAD_MAX_ATTEMPTS",
            get("UPLOAD_MAX_ATTEMPTS"),
            UPLOAD_MAX_ATTEMPTS,
        )?;
        let retry_base_ms = parse_or(
            "UPLOAD_RETRY_BASE_MS",
            get("UPLOAD_RETRY_BASE_MS"),
            UPLOAD_RETRY_BASE_MS,
        )?;
        let retry_max_ms = parse_or(
            "UPLOAD_RETRY_MAX_MS",
            get("UPLOAD_RETRY_MAX_MS"),
            UPLOAD_RETRY_MAX_MS,
        )?;

        let config = Config {
            bot_token: bot_token.unwrap_or_default(),
            immich_api_url: immich_api_url
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            immich_api_key: immich_api_key.unwrap_or_default(),
            allowed_user_ids,
            local_endpoint,
            log_level,
            log_format,
            bot_name: get("BOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
            device_id: get("IMMICH_DEVICE_ID").unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string()),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            upload_timeout: Duration::from_secs(upload_timeout_secs),
            retry_policy: RetryPolicy::new(
                max_attempts,
                Duration::from_millis(retry_base_ms),
                Duration::from_millis(retry_max_ms),
            ),
            temp_dir: get("TEMP_DIR").map(PathBuf::from).unwrap_or_else(env::temp_dir),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !is_http_url(&self.immich_api_url) {
            return Err(anyhow!("IMMICH_API_URL must start with http:// or https://"));
        }

        if let Some(local) = &self.local_endpoint {
            if !is_http_url(&local.base_url) {
                return Err(anyhow!("TELEGRAM_API_URL must start with http:// or https://"));
            }
            if local.api_id.parse::<u64>().is_err() {
                return Err(anyhow!("TELEGRAM_API_ID must be numeric"));
            }
        }

        if self.retry_policy.max_attempts == 0 {
            return Err(anyhow!("UPLOAD_MAX_ATTEMPTS must be at least 1"));
        }

        if self.fetch_timeout.is_zero() || self.upload_timeout.is_zero() {
            return Err(anyhow!(
                "FETCH_TIMEOUT_SECS and UPLOAD_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(())
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn immich_api_url(&self) -> &str {
        &self.immich_api_url
    }

    pub fn immich_api_key(&self) -> &str {
        &self.immich_api_key
    }

    pub fn allowed_user_ids(&self) -> &HashSet<i64> {
        &self.allowed_user_ids
    }

    pub fn local_endpoint(&self) -> Option<&LocalEndpoint> {
        self.local_endpoint.as_ref()
    }

    /// Capability flag derived once from the all-or-nothing local trio.
    pub fn has_local_endpoint(&self) -> bool {
        self.local_endpoint.is_some()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn temp_dir(&self) -> &std::path::Path {
        &self.temp_dir
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn parse_user_ids(raw: &str) -> Result<HashSet<i64>, anyhow::Error> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("ALLOWED_USER_IDS contains a non-integer value: '{}'", s))
        })
        .collect::<Result<HashSet<_>, _>>()?;

    if ids.is_empty() {
        return Err(anyhow!("ALLOWED_USER_IDS must contain at least one user id"));
    }
    Ok(ids)
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
{
    match value {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| anyhow!("{} must be a valid number (got '{}')", name, v)),
        None => Ok(default),
    }
}
