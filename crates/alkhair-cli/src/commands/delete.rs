use alkhair_core::remote::RemoteBackend;
use alkhair_core::{EntityKind, SchoolData};

use crate::commands::common::resolve_record_id;
use crate::error::CliError;

/// Removes the record from the local cache only. The next full pull brings it
/// back if it still exists remotely.
pub async fn run_delete<B: RemoteBackend>(
    data: &SchoolData<B>,
    kind: EntityKind,
    id: &str,
) -> Result<(), CliError> {
    let resolved_id = resolve_record_id(data, kind, id)?;
    data.delete_locally(kind, &resolved_id).await?;
    println!("{resolved_id}");
    Ok(())
}
