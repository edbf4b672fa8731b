use std::path::PathBuf;

use alkhair_core::remote::{PostgrestBackend, RemoteBackend};
use alkhair_core::services::RecordView;
use alkhair_core::{AppConfig, EntityKind, SchoolData};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct RecordListItem {
    pub id: String,
    pub updated_at: i64,
    pub relative_time: String,
    pub is_synced: bool,
    pub record: Value,
}

/// Configuration from the environment, with `--db-path` taking precedence
pub fn load_config(cli_db_path: Option<PathBuf>) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli_db_path {
        config.db_path = path;
    }
    Ok(config)
}

pub async fn open_school_data(
    config: &AppConfig,
) -> Result<SchoolData<PostgrestBackend>, CliError> {
    Ok(SchoolData::open(config).await?)
}

pub fn normalize_argument(value: &str, name: &'static str) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyArgument(name))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Resolve an exact id or a unique id prefix within one collection
pub fn resolve_record_id<B: RemoteBackend>(
    data: &SchoolData<B>,
    kind: EntityKind,
    query: &str,
) -> Result<String, CliError> {
    let query = normalize_argument(query, "Record ID")?;
    let records = data.records(kind)?;

    if records.iter().any(|record| record.id == query) {
        return Ok(query);
    }

    let matching_ids: Vec<&str> = records
        .iter()
        .map(|record| record.id.as_str())
        .filter(|id| id.starts_with(&query))
        .collect();

    match matching_ids.as_slice() {
        [] => Err(CliError::RecordNotFound {
            collection: kind.collection(),
            id: query,
        }),
        [only] => Ok((*only).to_string()),
        many => {
            let options = many
                .iter()
                .take(3)
                .map(|id| id.chars().take(13).collect::<String>())
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousRecordId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn record_to_list_item(view: &RecordView, now_ms: i64) -> RecordListItem {
    RecordListItem {
        id: view.id.clone(),
        updated_at: view.updated_at,
        relative_time: format_relative_time(view.updated_at, now_ms),
        is_synced: view.is_synced,
        record: view.record.clone(),
    }
}

pub fn format_record_lines(records: &[RecordView]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    records
        .iter()
        .map(|view| {
            let short_id = view.id.chars().take(13).collect::<String>();
            let relative_time = format_relative_time(view.updated_at, now_ms);
            let marker = if view.is_synced { ' ' } else { '*' };
            let summary = record_summary(&view.record, 60);
            format!("{short_id:<13} {marker} {relative_time:<10}  {summary}")
        })
        .collect()
}

/// `key=value` pairs of the record's own fields, truncated to `max_chars`
pub fn record_summary(record: &Value, max_chars: usize) -> String {
    let Some(fields) = record.as_object() else {
        return truncate(&record.to_string(), max_chars);
    };

    let joined = fields
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "id" | "updated_at"))
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ");
    truncate(&joined, max_chars)
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Minor currency units as a two-decimal amount
pub fn format_amount(minor_units: i64) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let absolute = minor_units.unsigned_abs();
    format!("{sign}{}.{:02}", absolute / 100, absolute % 100)
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    if timestamp_ms <= 0 {
        return "never".to_string();
    }
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
