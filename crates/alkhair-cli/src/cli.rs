use std::path::PathBuf;
use std::str::FromStr;

use alkhair_core::EntityKind;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "alkhair")]
#[command(about = "Sync and browse Al-Khair school data from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull remote changes into the local database
    Sync {
        /// Collection to sync, or `all`
        #[arg(default_value = "all", value_parser = parse_sync_target)]
        target: SyncTarget,
        /// Pull everything updated after this Unix ms timestamp instead of
        /// the stored cursor (the cursor is left untouched)
        #[arg(long, value_name = "MS")]
        since: Option<i64>,
        /// Forget stored cursors first and pull everything again
        #[arg(long, conflicts_with = "since")]
        full: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List locally cached records
    List {
        /// Collection to list
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a record from the local database only
    Delete {
        /// Collection holding the record
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        /// Record ID or unique ID prefix
        id: String,
    },
    /// Show a student's attendance
    Attendance {
        student_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a student's fees and outstanding balance
    Fees {
        student_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show homework set for a class
    Homework {
        class_name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep syncing every collection until interrupted
    Watch {
        /// Seconds between passes (defaults to ALKHAIR_SYNC_INTERVAL_SECS)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncTarget {
    All,
    One(EntityKind),
}

impl SyncTarget {
    pub fn kinds(self) -> Vec<EntityKind> {
        match self {
            Self::All => EntityKind::ALL.to_vec(),
            Self::One(kind) => vec![kind],
        }
    }
}

pub fn parse_entity(value: &str) -> Result<EntityKind, String> {
    EntityKind::from_str(value).map_err(|error| error.to_string())
}

pub fn parse_sync_target(value: &str) -> Result<SyncTarget, String> {
    if value.trim().eq_ignore_ascii_case("all") {
        Ok(SyncTarget::All)
    } else {
        parse_entity(value).map(SyncTarget::One)
    }
}
