//! Attendance model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::syncable::{impl_syncable, new_record_id};
use crate::util::unix_millis_now;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Late arrivals still count as attended
    pub const fn is_attended(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

/// One student's attendance mark for one school day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: String,
    pub student_id: String,
    pub class_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub updated_at: i64,
    #[serde(skip_serializing, default)]
    pub is_synced: bool,
}

impl_syncable!(Attendance, "attendance");

impl Attendance {
    #[must_use]
    pub fn new(
        student_id: impl Into<String>,
        class_name: impl Into<String>,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            id: new_record_id(),
            student_id: student_id.into(),
            class_name: class_name.into(),
            date,
            status,
            updated_at: unix_millis_now(),
            is_synced: false,
        }
    }
}

pub fn attendance_for_student(records: &[Attendance], student_id: &str) -> Vec<Attendance> {
    let mut matching: Vec<Attendance> = records
        .iter()
        .filter(|record| record.student_id == student_id)
        .cloned()
        .collect();
    matching.sort_by_key(|record| record.date);
    matching
}

/// Percentage of marked days the student attended.
///
/// Returns `None` when the student has no marks at all.
#[allow(clippy::cast_precision_loss)]
pub fn attendance_percentage(records: &[Attendance], student_id: &str) -> Option<f64> {
    let (attended, total) = records
        .iter()
        .filter(|record| record.student_id == student_id)
        .fold((0usize, 0usize), |(attended, total), record| {
            (
                attended + usize::from(record.status.is_attended()),
                total + 1,
            )
        });

    if total == 0 {
        None
    } else {
        Some(attended as f64 * 100.0 / total as f64)
    }
}

/// Marks recorded for a class on a given day
pub fn attendance_on(records: &[Attendance], date: NaiveDate, class_name: &str) -> Vec<Attendance> {
    records
        .iter()
        .filter(|record| record.date == date && record.class_name.eq_ignore_ascii_case(class_name))
        .cloned()
        .collect()
}
