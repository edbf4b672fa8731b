use std::sync::Arc;
use std::time::Duration;

use alkhair_core::models::{
    Attendance, AttendanceStatus, EntityKind, Fee, FeeStatus, Homework, Leave, Syncable,
};
use alkhair_core::remote::MemoryBackend;
use alkhair_core::services::{AutoSync, RecordView};
use alkhair_core::SchoolData;
use chrono::NaiveDate;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{parse_entity, parse_sync_target, Cli, Commands, CompletionShell, SyncTarget};
use crate::commands::attendance::attendance_summary;
use crate::commands::common::{
    format_amount, format_relative_time, format_sync_timestamp, normalize_argument,
    record_summary, resolve_record_id, truncate,
};
use crate::commands::completions::render_completions;
use crate::commands::delete::run_delete;
use crate::commands::fees::fee_statement;
use crate::commands::sync::{format_sync_lines, sync_outcomes};
use crate::commands::run_and_close;
use crate::commands::watch::{resolve_interval, stop_and_close};
use crate::error::CliError;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
}

fn stamped<T: Syncable>(mut record: T, updated_at: i64) -> T {
    record.touch(updated_at);
    record
}

async fn school(backend: &MemoryBackend) -> SchoolData<MemoryBackend> {
    SchoolData::open_in_memory(backend.clone()).await.unwrap()
}

#[test]
fn entity_names_parse_case_insensitively() {
    assert_eq!(parse_entity("Fees").unwrap(), EntityKind::Fees);
    assert!(parse_entity("grades").is_err());
    assert_eq!(parse_sync_target("ALL").unwrap(), SyncTarget::All);
    assert_eq!(
        parse_sync_target("leaves").unwrap(),
        SyncTarget::One(EntityKind::Leaves)
    );
    assert_eq!(SyncTarget::All.kinds().len(), EntityKind::ALL.len());
}

#[test]
fn sync_defaults_to_all_collections() {
    let cli = Cli::try_parse_from(["alkhair", "sync"]).unwrap();
    match cli.command {
        Commands::Sync {
            target,
            since,
            full,
            json,
        } => {
            assert_eq!(target, SyncTarget::All);
            assert_eq!(since, None);
            assert!(!full && !json);
        }
        _ => panic!("expected sync command"),
    }
}

#[test]
fn sync_rejects_since_with_full() {
    assert!(Cli::try_parse_from(["alkhair", "sync", "--since", "5", "--full"]).is_err());
}

#[test]
fn db_path_is_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["alkhair", "list", "fees", "--db-path", "/tmp/x.db"]).unwrap();
    assert_eq!(
        cli.db_path.as_deref(),
        Some(std::path::Path::new("/tmp/x.db"))
    );
}

#[test]
fn normalize_argument_trims_and_rejects_empty() {
    assert_eq!(normalize_argument("  7A ", "Class").unwrap(), "7A");
    assert!(matches!(
        normalize_argument(" \t", "Class"),
        Err(CliError::EmptyArgument("Class"))
    ));
}

#[test]
fn format_amount_uses_two_decimals() {
    assert_eq!(format_amount(0), "0.00");
    assert_eq!(format_amount(123_456), "1234.56");
    assert_eq!(format_amount(-5), "-0.05");
}

#[test]
fn format_relative_time_buckets() {
    let now = 10 * 24 * 60 * 60 * 1000;
    assert_eq!(format_relative_time(now - 5_000, now), "just now");
    assert_eq!(format_relative_time(now - 3 * 60_000, now), "3m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 8 * 24 * 60 * 60_000, now), "1w ago");
}

#[test]
fn format_sync_timestamp_handles_empty_cursor() {
    assert_eq!(format_sync_timestamp(0), "never");
    assert_eq!(format_sync_timestamp(1_000), "1970-01-01 00:00:01 UTC");
}

#[test]
fn truncate_collapses_whitespace() {
    assert_eq!(truncate("a  b\nc", 10), "a b c");
    assert_eq!(truncate("abcdefghij", 6), "abc...");
}

#[test]
fn record_summary_skips_control_fields() {
    let record = json!({
        "id": "abc",
        "updated_at": 10,
        "month": "2024-09",
        "amount": 500
    });
    assert_eq!(record_summary(&record, 80), "amount=500 month=2024-09");
}

#[test]
fn resolve_interval_prefers_cli_value() {
    let configured = Duration::from_secs(60);
    assert_eq!(resolve_interval(None, configured).unwrap(), configured);
    assert_eq!(
        resolve_interval(Some(5), configured).unwrap(),
        Duration::from_secs(5)
    );
    assert!(matches!(
        resolve_interval(Some(0), configured),
        Err(CliError::InvalidInterval)
    ));
}

#[test]
fn completions_name_the_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("alkhair"));

    let cli = Cli::try_parse_from(["alkhair", "completions", "powershell"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Completions {
            shell: CompletionShell::PowerShell,
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_outcomes_report_each_collection() {
    let backend = MemoryBackend::new();
    backend
        .put(&stamped(Fee::new("s1", "2024-09", 4000), 100))
        .unwrap();
    backend.fail_next::<Leave>(1);
    let data = school(&backend).await;

    let outcomes = sync_outcomes(&data, SyncTarget::All, None, false)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), EntityKind::ALL.len());
    let fees = outcomes
        .iter()
        .find(|outcome| outcome.collection == "fees")
        .unwrap();
    assert_eq!((fees.merged, fees.cursor), (1, 100));
    let leaves = outcomes
        .iter()
        .find(|outcome| outcome.collection == "leaves")
        .unwrap();
    assert!(leaves.error.is_some());

    let lines = format_sync_lines(&outcomes);
    assert!(lines.iter().any(|line| line.starts_with("leaves") && line.contains("failed")));
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_since_does_not_move_cursor() {
    let backend = MemoryBackend::new();
    backend
        .put(&stamped(Fee::new("s1", "2024-09", 4000), 100))
        .unwrap();
    let data = school(&backend).await;

    let outcomes = sync_outcomes(&data, SyncTarget::One(EntityKind::Fees), Some(0), false)
        .await
        .unwrap();

    assert_eq!(outcomes[0].merged, 1);
    assert_eq!(data.last_sync(EntityKind::Fees).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn full_sync_pulls_again() {
    let backend = MemoryBackend::new();
    backend
        .put(&stamped(Fee::new("s1", "2024-09", 4000), 100))
        .unwrap();
    let data = school(&backend).await;
    let target = SyncTarget::One(EntityKind::Fees);

    sync_outcomes(&data, target, None, false).await.unwrap();
    let again = sync_outcomes(&data, target, None, false).await.unwrap();
    assert_eq!(again[0].merged, 0);

    let full = sync_outcomes(&data, target, None, true).await.unwrap();
    assert_eq!(full[0].merged, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_resolves_unique_prefix() {
    let backend = MemoryBackend::new();
    let data = school(&backend).await;
    let homework = data
        .homework()
        .save_local(Homework::new("7A", "Math", "Sums", date(5), "t1"))
        .await
        .unwrap();

    let prefix: String = homework.id.chars().take(20).collect();
    run_delete(&data, EntityKind::Homework, &prefix)
        .await
        .unwrap();

    assert!(data.homework().snapshot().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn resolve_record_id_reports_missing_and_ambiguous() {
    let backend = MemoryBackend::new();
    let data = school(&backend).await;
    for id in ["abc-1", "abc-2"] {
        let mut leave = Leave::new("t1", date(1), date(2), "");
        leave.id = id.to_string();
        data.leaves().save_local(leave).await.unwrap();
    }

    assert_eq!(
        resolve_record_id(&data, EntityKind::Leaves, "abc-2").unwrap(),
        "abc-2"
    );
    assert!(matches!(
        resolve_record_id(&data, EntityKind::Leaves, "abc"),
        Err(CliError::AmbiguousRecordId(_))
    ));
    assert!(matches!(
        resolve_record_id(&data, EntityKind::Leaves, "zzz"),
        Err(CliError::RecordNotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn attendance_and_fee_summaries() {
    let backend = MemoryBackend::new();
    backend
        .put(&Attendance::new("s1", "7A", date(2), AttendanceStatus::Present))
        .unwrap();
    backend
        .put(&Attendance::new("s1", "7A", date(3), AttendanceStatus::Late))
        .unwrap();
    backend
        .put(&Attendance::new("s1", "7A", date(4), AttendanceStatus::Absent))
        .unwrap();
    backend
        .put(&Attendance::new("s1", "7A", date(5), AttendanceStatus::Excused))
        .unwrap();
    let mut partial = Fee::new("s1", "2024-09", 4000);
    partial.status = FeeStatus::Partial;
    partial.amount_paid = 1500;
    backend.put(&partial).unwrap();

    let data = school(&backend).await;
    data.refresh_all().await;

    let summary = attendance_summary(&data, " s1 ").unwrap();
    assert_eq!(summary.student_id, "s1");
    assert_eq!(summary.percentage, Some(50.0));
    assert_eq!(summary.marks.len(), 4);

    let statement = fee_statement(&data, "s1").unwrap();
    assert_eq!(statement.outstanding, 2500);
    assert_eq!(statement.fees.len(), 1);
}

#[test]
fn list_item_serializes_control_fields() {
    let view = RecordView {
        id: "r1".to_string(),
        updated_at: 5,
        is_synced: false,
        record: json!({"id": "r1"}),
    };
    let item = crate::commands::common::record_to_list_item(&view, 5);
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["is_synced"], json!(false));
    assert_eq!(value["relative_time"], json!("just now"));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_reports_stored_cursor() {
    let backend = MemoryBackend::new();
    backend
        .put(&stamped(Fee::new("s1", "2024-09", 4000), 500))
        .unwrap();
    let data = school(&backend).await;
    let target = SyncTarget::One(EntityKind::Fees);
    sync_outcomes(&data, target, None, false).await.unwrap();

    backend.fail_next::<Fee>(1);
    let outcomes = sync_outcomes(&data, target, None, false).await.unwrap();

    assert!(outcomes[0].error.is_some());
    assert_eq!(outcomes[0].cursor, 500);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_command_still_returns_its_error() {
    let backend = MemoryBackend::new();
    let data = school(&backend).await;

    let result = run_and_close(
        data,
        Commands::Delete {
            entity: EntityKind::Fees,
            id: "missing".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(CliError::RecordNotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn watch_shutdown_releases_database() {
    let backend = MemoryBackend::new();
    let data = Arc::new(school(&backend).await);
    let weak = Arc::downgrade(&data);
    let auto_sync = AutoSync::start(Arc::clone(&data), Duration::from_millis(20));

    stop_and_close(auto_sync, data).await;

    assert!(weak.upgrade().is_none());
}
