use std::sync::Arc;
use std::time::Duration;

use alkhair_core::remote::RemoteBackend;
use alkhair_core::services::AutoSync;
use alkhair_core::SchoolData;

use crate::error::CliError;

pub fn resolve_interval(
    cli_interval: Option<u64>,
    configured: Duration,
) -> Result<Duration, CliError> {
    match cli_interval {
        Some(0) => Err(CliError::InvalidInterval),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(configured),
    }
}

pub async fn run_watch<B: RemoteBackend>(
    data: SchoolData<B>,
    interval: Duration,
) -> Result<(), CliError> {
    let data = Arc::new(data);
    let auto_sync = AutoSync::start(Arc::clone(&data), interval);
    println!("Syncing every {}s. Press Ctrl-C to stop.", interval.as_secs());

    let signal = tokio::signal::ctrl_c().await;
    stop_and_close(auto_sync, data).await;
    signal?;
    println!("Stopped");
    Ok(())
}

/// Stop the loop, then close the database once no task still holds it.
pub async fn stop_and_close<B: RemoteBackend>(auto_sync: AutoSync, data: Arc<SchoolData<B>>) {
    auto_sync.stop().await;
    match Arc::try_unwrap(data) {
        Ok(data) => data.close().await,
        Err(_) => tracing::warn!("School database still shared after auto-sync stopped"),
    }
}
