//! Fee model

use serde::{Deserialize, Serialize};

use super::syncable::{impl_syncable, new_record_id};
use crate::util::unix_millis_now;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    Paid,
    Unpaid,
    Partial,
}

/// Monthly fee owed by a student. Amounts are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub id: String,
    pub student_id: String,
    /// Billing month as `YYYY-MM`
    pub month: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_paid: i64,
    pub status: FeeStatus,
    pub updated_at: i64,
    #[serde(skip_serializing, default)]
    pub is_synced: bool,
}

impl_syncable!(Fee, "fees");

impl Fee {
    #[must_use]
    pub fn new(student_id: impl Into<String>, month: impl Into<String>, amount: i64) -> Self {
        Self {
            id: new_record_id(),
            student_id: student_id.into(),
            month: month.into(),
            amount,
            amount_paid: 0,
            status: FeeStatus::Unpaid,
            updated_at: unix_millis_now(),
            is_synced: false,
        }
    }

    /// Amount actually received for this fee
    pub fn received(&self) -> i64 {
        match self.status {
            FeeStatus::Paid => self.amount,
            // Credit notes carry a negative amount
            FeeStatus::Partial => self
                .amount_paid
                .clamp(self.amount.min(0), self.amount.max(0)),
            FeeStatus::Unpaid => 0,
        }
    }

    /// Amount still owed
    pub fn outstanding(&self) -> i64 {
        self.amount - self.received()
    }
}

/// Fees billed to a student, most recent month first
pub fn fees_for_student(fees: &[Fee], student_id: &str) -> Vec<Fee> {
    let mut matching: Vec<Fee> = fees
        .iter()
        .filter(|fee| fee.student_id == student_id)
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.month.cmp(&a.month));
    matching
}

pub fn outstanding_balance(fees: &[Fee], student_id: &str) -> i64 {
    fees.iter()
        .filter(|fee| fee.student_id == student_id)
        .map(Fee::outstanding)
        .sum()
}

/// Total received across all students for a billing month
pub fn collected_total(fees: &[Fee], month: &str) -> i64 {
    fees.iter()
        .filter(|fee| fee.month == month)
        .map(Fee::received)
        .sum()
}
