use alkhair_core::remote::RemoteBackend;
use alkhair_core::{EntityKind, SchoolData};
use serde::Serialize;

use crate::cli::SyncTarget;
use crate::commands::common::format_sync_timestamp;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    pub collection: &'static str,
    pub merged: usize,
    pub cursor: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn run_sync<B: RemoteBackend>(
    data: &SchoolData<B>,
    target: SyncTarget,
    since: Option<i64>,
    full: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let outcomes = sync_outcomes(data, target, since, full).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for line in format_sync_lines(&outcomes) {
            println!("{line}");
        }
    }

    let failed = outcomes
        .iter()
        .filter(|outcome| outcome.error.is_some())
        .count();
    if failed > 0 {
        return Err(CliError::SyncFailed(failed));
    }
    Ok(())
}

pub async fn sync_outcomes<B: RemoteBackend>(
    data: &SchoolData<B>,
    target: SyncTarget,
    since: Option<i64>,
    full: bool,
) -> Result<Vec<SyncOutcome>, CliError> {
    let kinds = target.kinds();
    if full {
        for kind in &kinds {
            data.reset_cursor(*kind).await?;
        }
    }

    let results = match (since, target) {
        (Some(since), _) => {
            let mut results = Vec::with_capacity(kinds.len());
            for kind in kinds {
                results.push((kind, data.pull_since(kind, since).await));
            }
            results
        }
        (None, SyncTarget::All) => data.refresh_all().await,
        (None, SyncTarget::One(kind)) => vec![(kind, data.refresh(kind).await)],
    };

    let mut outcomes = Vec::with_capacity(results.len());
    for (kind, result) in results {
        // A failed pass leaves the stored cursor where it was
        let started_from = match since {
            Some(since) => since,
            None if result.is_err() => data.last_sync(kind).await?,
            None => 0,
        };
        outcomes.push(to_outcome(kind, started_from, result));
    }
    Ok(outcomes)
}

fn to_outcome(
    kind: EntityKind,
    started_from: i64,
    result: alkhair_core::Result<alkhair_core::SyncReport>,
) -> SyncOutcome {
    match result {
        Ok(report) => SyncOutcome {
            collection: report.collection,
            merged: report.merged,
            cursor: report.cursor,
            error: None,
        },
        Err(error) => SyncOutcome {
            collection: kind.collection(),
            merged: 0,
            cursor: started_from,
            error: Some(error.to_string()),
        },
    }
}

pub fn format_sync_lines(outcomes: &[SyncOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|outcome| match &outcome.error {
            Some(error) => format!("{:<14} failed: {error}", outcome.collection),
            None => format!(
                "{:<14} {:>5} merged  up to {}",
                outcome.collection,
                outcome.merged,
                format_sync_timestamp(outcome.cursor)
            ),
        })
        .collect()
}
