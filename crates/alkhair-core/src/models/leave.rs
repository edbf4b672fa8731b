//! Leave request model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::syncable::{impl_syncable, new_record_id};
use crate::util::unix_millis_now;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Leave request raised by a student or teacher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leave {
    pub id: String,
    pub requester_id: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
    pub status: LeaveStatus,
    pub updated_at: i64,
    #[serde(skip_serializing, default)]
    pub is_synced: bool,
}

impl_syncable!(Leave, "leaves");

impl Leave {
    #[must_use]
    pub fn new(
        requester_id: impl Into<String>,
        from_date: NaiveDate,
        to_date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: new_record_id(),
            requester_id: requester_id.into(),
            from_date,
            to_date,
            reason: reason.into(),
            status: LeaveStatus::Pending,
            updated_at: unix_millis_now(),
            is_synced: false,
        }
    }

    /// Number of calendar days covered, inclusive. Zero for inverted ranges.
    pub fn days(&self) -> i64 {
        let span = (self.to_date - self.from_date).num_days();
        if span < 0 {
            0
        } else {
            span + 1
        }
    }
}

/// Requests still awaiting a decision, oldest first
pub fn pending_leaves(leaves: &[Leave]) -> Vec<Leave> {
    let mut pending: Vec<Leave> = leaves
        .iter()
        .filter(|leave| leave.status == LeaveStatus::Pending)
        .cloned()
        .collect();
    pending.sort_by_key(|leave| leave.from_date);
    pending
}

pub fn leaves_for_requester(leaves: &[Leave], requester_id: &str) -> Vec<Leave> {
    let mut matching: Vec<Leave> = leaves
        .iter()
        .filter(|leave| leave.requester_id == requester_id)
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.from_date.cmp(&a.from_date));
    matching
}
