//! Homework model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::syncable::{impl_syncable, new_record_id};
use crate::util::unix_millis_now;

/// A homework assignment posted by a teacher for a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Homework {
    pub id: String,
    pub class_name: String,
    pub subject: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    pub teacher_id: String,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    #[serde(skip_serializing, default)]
    pub is_synced: bool,
}

impl_syncable!(Homework, "homework");

impl Homework {
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        subject: impl Into<String>,
        title: impl Into<String>,
        due_date: NaiveDate,
        teacher_id: impl Into<String>,
    ) -> Self {
        Self {
            id: new_record_id(),
            class_name: class_name.into(),
            subject: subject.into(),
            title: title.into(),
            description: String::new(),
            due_date,
            teacher_id: teacher_id.into(),
            updated_at: unix_millis_now(),
            is_synced: false,
        }
    }
}

/// Homework for a class, earliest due date first
pub fn homework_for_class(homework: &[Homework], class_name: &str) -> Vec<Homework> {
    let mut matching: Vec<Homework> = homework
        .iter()
        .filter(|item| item.class_name.eq_ignore_ascii_case(class_name))
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
    matching
}

/// Homework due within `[from, to]` (inclusive)
pub fn homework_due_between(homework: &[Homework], from: NaiveDate, to: NaiveDate) -> Vec<Homework> {
    let mut matching: Vec<Homework> = homework
        .iter()
        .filter(|item| item.due_date >= from && item.due_date <= to)
        .cloned()
        .collect();
    matching.sort_by_key(|item| item.due_date);
    matching
}
