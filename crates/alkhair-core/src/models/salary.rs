//! Salary model

use serde::{Deserialize, Serialize};

use super::syncable::{impl_syncable, new_record_id};
use crate::util::unix_millis_now;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryStatus {
    Paid,
    Pending,
}

/// Monthly salary entry for a teacher (minor currency units)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salary {
    pub id: String,
    pub teacher_id: String,
    pub month: String,
    pub amount: i64,
    pub status: SalaryStatus,
    pub updated_at: i64,
    #[serde(skip_serializing, default)]
    pub is_synced: bool,
}

impl_syncable!(Salary, "salaries");

impl Salary {
    #[must_use]
    pub fn new(teacher_id: impl Into<String>, month: impl Into<String>, amount: i64) -> Self {
        Self {
            id: new_record_id(),
            teacher_id: teacher_id.into(),
            month: month.into(),
            amount,
            status: SalaryStatus::Pending,
            updated_at: unix_millis_now(),
            is_synced: false,
        }
    }
}

pub fn salaries_for_teacher(salaries: &[Salary], teacher_id: &str) -> Vec<Salary> {
    let mut matching: Vec<Salary> = salaries
        .iter()
        .filter(|salary| salary.teacher_id == teacher_id)
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.month.cmp(&a.month));
    matching
}

pub fn pending_salary_total(salaries: &[Salary]) -> i64 {
    salaries
        .iter()
        .filter(|salary| salary.status == SalaryStatus::Pending)
        .map(|salary| salary.amount)
        .sum()
}
