use std::io;

use alkhair_core::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] alkhair_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("{0} cannot be empty")]
    EmptyArgument(&'static str),
    #[error("No {collection} record found for id/prefix: {id}")]
    RecordNotFound {
        collection: &'static str,
        id: String,
    },
    #[error("{0}")]
    AmbiguousRecordId(String),
    #[error("Sync interval must be at least 1 second")]
    InvalidInterval,
    #[error(
        "Remote backend is not configured. Set ALKHAIR_SUPABASE_URL and ALKHAIR_SUPABASE_ANON_KEY to enable `alkhair sync`."
    )]
    RemoteNotConfigured,
    #[error("Sync failed for {0} collection(s)")]
    SyncFailed(usize),
}
