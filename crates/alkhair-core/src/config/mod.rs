//! Runtime configuration read from the environment.
//!
//! Everything has a default except the remote backend, which is optional as a
//! whole: without it the local database is still readable offline.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::util::is_http_url;

pub const ENV_SUPABASE_URL: &str = "ALKHAIR_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "ALKHAIR_SUPABASE_ANON_KEY";
pub const ENV_ACCESS_TOKEN: &str = "ALKHAIR_ACCESS_TOKEN";
pub const ENV_DB_PATH: &str = "ALKHAIR_DB_PATH";
pub const ENV_SYNC_INTERVAL_SECS: &str = "ALKHAIR_SYNC_INTERVAL_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ALKHAIR_HTTP_TIMEOUT_SECS";

const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Supabase project the remote sources talk to
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub supabase_url: String,
    pub anon_key: String,
    /// Signed-in user's JWT; requests fall back to the anon key without it
    pub access_token: Option<String>,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RemoteConfig")
            .field("supabase_url", &self.supabase_url)
            .field("anon_key", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub remote: Option<RemoteConfig>,
    pub sync_interval: Duration,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = match optional_trimmed(&lookup, ENV_DB_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let remote = parse_remote_config(&lookup)?;

        let sync_interval_secs = parse_secs(
            &lookup,
            ENV_SYNC_INTERVAL_SECS,
            DEFAULT_SYNC_INTERVAL_SECS,
            5..=86_400,
        )?;
        let http_timeout_secs = parse_secs(
            &lookup,
            ENV_HTTP_TIMEOUT_SECS,
            DEFAULT_HTTP_TIMEOUT_SECS,
            1..=300,
        )?;

        Ok(Self {
            db_path,
            remote,
            sync_interval: Duration::from_secs(sync_interval_secs),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Remote settings, or an error naming what is missing
    pub fn require_remote(&self) -> Result<&RemoteConfig, ConfigError> {
        self.remote
            .as_ref()
            .ok_or(ConfigError::MissingVar(ENV_SUPABASE_URL))
    }
}

/// `<data dir>/alkhair/alkhair.db`
pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        ConfigError::Invalid(format!(
            "could not determine a data directory; set {ENV_DB_PATH}"
        ))
    })?;
    Ok(data_dir.join("alkhair").join("alkhair.db"))
}

fn parse_remote_config(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<RemoteConfig>, ConfigError> {
    let supabase_url = optional_trimmed(&lookup, ENV_SUPABASE_URL);
    let anon_key = optional_trimmed(&lookup, ENV_SUPABASE_ANON_KEY);
    let access_token = optional_trimmed(&lookup, ENV_ACCESS_TOKEN);

    if supabase_url.is_none() && anon_key.is_none() {
        return Ok(None);
    }

    let supabase_url = supabase_url.ok_or(ConfigError::MissingVar(ENV_SUPABASE_URL))?;
    let anon_key = anon_key.ok_or(ConfigError::MissingVar(ENV_SUPABASE_ANON_KEY))?;
    if !is_http_url(&supabase_url) {
        return Err(ConfigError::Invalid(format!(
            "{ENV_SUPABASE_URL} must start with http:// or https://"
        )));
    }

    Ok(Some(RemoteConfig {
        supabase_url: supabase_url.trim_end_matches('/').to_string(),
        anon_key,
        access_token,
    }))
}

fn parse_secs(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
    range: std::ops::RangeInclusive<u64>,
) -> Result<u64, ConfigError> {
    let Some(raw) = optional_trimmed(lookup, name) else {
        return Ok(default);
    };
    let invalid = || {
        ConfigError::Invalid(format!(
            "{name} must be an integer in [{}, {}]",
            range.start(),
            range.end()
        ))
    };

    let value = raw.parse::<u64>().map_err(|_| invalid())?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(invalid())
    }
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
