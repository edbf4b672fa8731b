//! Data models for Al-Khair

mod announcement;
mod attendance;
mod fee;
mod homework;
mod leave;
mod salary;
mod syncable;
mod user;

use std::fmt;
use std::str::FromStr;

pub use announcement::{announcements_for_role, Announcement, Audience};
pub use attendance::{
    attendance_for_student, attendance_on, attendance_percentage, Attendance, AttendanceStatus,
};
pub use fee::{collected_total, fees_for_student, outstanding_balance, Fee, FeeStatus};
pub use homework::{homework_due_between, homework_for_class, Homework};
pub use leave::{leaves_for_requester, pending_leaves, Leave, LeaveStatus};
pub use salary::{pending_salary_total, salaries_for_teacher, Salary, SalaryStatus};
pub use syncable::{new_record_id, Syncable};
pub use user::{find_user_by_email, students_in_class, users_with_role, Role, User};

/// The synced entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Users,
    Homework,
    Announcements,
    Fees,
    Attendance,
    Salaries,
    Leaves,
}

impl EntityKind {
    pub const ALL: [Self; 7] = [
        Self::Users,
        Self::Homework,
        Self::Announcements,
        Self::Fees,
        Self::Attendance,
        Self::Salaries,
        Self::Leaves,
    ];

    /// Collection / remote table name
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Users => User::COLLECTION,
            Self::Homework => Homework::COLLECTION,
            Self::Announcements => Announcement::COLLECTION,
            Self::Fees => Fee::COLLECTION,
            Self::Attendance => Attendance::COLLECTION,
            Self::Salaries => Salary::COLLECTION,
            Self::Leaves => Leave::COLLECTION,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for EntityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == wanted)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unknown collection: {s}")))
    }
}
