//! Shared services used by client front ends.

mod refresh;
mod school;

pub use refresh::{spawn_refresh, AutoSync, RefreshHandle, MIN_AUTO_SYNC_INTERVAL};
pub use school::{RecordView, Repo, SchoolData};
