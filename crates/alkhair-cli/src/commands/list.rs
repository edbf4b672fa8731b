use alkhair_core::remote::RemoteBackend;
use alkhair_core::{EntityKind, SchoolData};
use chrono::Utc;

use crate::commands::common::{format_record_lines, record_to_list_item, RecordListItem};
use crate::error::CliError;

pub fn run_list<B: RemoteBackend>(
    data: &SchoolData<B>,
    kind: EntityKind,
    limit: usize,
    as_json: bool,
) -> Result<(), CliError> {
    let mut records = data.records(kind)?;
    records.truncate(limit);

    if as_json {
        let now_ms = Utc::now().timestamp_millis();
        let json_items = records
            .iter()
            .map(|view| record_to_list_item(view, now_ms))
            .collect::<Vec<RecordListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No {kind} cached locally. Run `alkhair sync {kind}` first.");
        return Ok(());
    }

    for line in format_record_lines(&records) {
        println!("{line}");
    }
    Ok(())
}
