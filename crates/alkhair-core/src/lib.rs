//! alkhair-core - Core library for Al-Khair
//!
//! Shared models, the local record store, remote sources, and the incremental
//! pull-merge sync that keeps the two in step. Used by the `alkhair` CLI and
//! any other front end.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod repository;
pub mod services;
pub mod state;
pub mod store;
pub mod sync;
pub mod util;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use models::{EntityKind, Syncable};
pub use repository::EntityRepository;
pub use services::SchoolData;
pub use state::UiState;
pub use sync::{SyncCoordinator, SyncReport};
