pub mod attendance;
pub mod common;
pub mod completions;
pub mod delete;
pub mod fees;
pub mod homework;
pub mod list;
pub mod sync;
pub mod watch;

use alkhair_core::remote::RemoteBackend;
use alkhair_core::SchoolData;

use crate::cli::Commands;
use crate::error::CliError;

/// Run a one-shot command, then close the database whether it failed or not.
pub async fn run_and_close<B: RemoteBackend>(
    data: SchoolData<B>,
    command: Commands,
) -> Result<(), CliError> {
    let result = dispatch(&data, command).await;
    data.close().await;
    result
}

async fn dispatch<B: RemoteBackend>(
    data: &SchoolData<B>,
    command: Commands,
) -> Result<(), CliError> {
    match command {
        Commands::Sync {
            target,
            since,
            full,
            json,
        } => {
            if !data.backend().is_configured() {
                return Err(CliError::RemoteNotConfigured);
            }
            sync::run_sync(data, target, since, full, json).await
        }
        Commands::List {
            entity,
            limit,
            json,
        } => list::run_list(data, entity, limit, json),
        Commands::Delete { entity, id } => delete::run_delete(data, entity, &id).await,
        Commands::Attendance { student_id, json } => {
            attendance::run_attendance(data, &student_id, json)
        }
        Commands::Fees { student_id, json } => fees::run_fees(data, &student_id, json),
        Commands::Homework { class_name, json } => {
            homework::run_homework(data, &class_name, json)
        }
        // Handled before the database is opened or run until interrupted
        Commands::Watch { .. } | Commands::Completions { .. } => Ok(()),
    }
}
