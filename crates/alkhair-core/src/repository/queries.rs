//! Read-side views each screen needs, computed over the latest snapshot

use chrono::NaiveDate;

use super::EntityRepository;
use crate::models::{
    announcements_for_role, attendance_for_student, attendance_on, attendance_percentage,
    collected_total, fees_for_student, find_user_by_email, homework_due_between,
    homework_for_class, leaves_for_requester, outstanding_balance, pending_leaves,
    pending_salary_total, salaries_for_teacher, students_in_class, users_with_role, Announcement,
    Attendance, Fee, Homework, Leave, Role, Salary, User,
};
use crate::remote::RemoteSource;
use crate::store::LocalStore;

impl<L: LocalStore<User>, R: RemoteSource<User>> EntityRepository<User, L, R> {
    pub fn with_role(&self, role: Role) -> Vec<User> {
        users_with_role(&self.snapshot(), role)
    }

    pub fn students_in_class(&self, class_name: &str) -> Vec<User> {
        students_in_class(&self.snapshot(), class_name)
    }

    pub fn by_email(&self, email: &str) -> Option<User> {
        find_user_by_email(&self.snapshot(), email).cloned()
    }
}

impl<L: LocalStore<Homework>, R: RemoteSource<Homework>> EntityRepository<Homework, L, R> {
    pub fn for_class(&self, class_name: &str) -> Vec<Homework> {
        homework_for_class(&self.snapshot(), class_name)
    }

    pub fn due_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Homework> {
        homework_due_between(&self.snapshot(), from, to)
    }
}

impl<L: LocalStore<Announcement>, R: RemoteSource<Announcement>>
    EntityRepository<Announcement, L, R>
{
    pub fn for_role(&self, role: Role) -> Vec<Announcement> {
        announcements_for_role(&self.snapshot(), role)
    }
}

impl<L: LocalStore<Fee>, R: RemoteSource<Fee>> EntityRepository<Fee, L, R> {
    pub fn for_student(&self, student_id: &str) -> Vec<Fee> {
        fees_for_student(&self.snapshot(), student_id)
    }

    pub fn outstanding_for(&self, student_id: &str) -> i64 {
        outstanding_balance(&self.snapshot(), student_id)
    }

    pub fn collected_in(&self, month: &str) -> i64 {
        collected_total(&self.snapshot(), month)
    }
}

impl<L: LocalStore<Attendance>, R: RemoteSource<Attendance>> EntityRepository<Attendance, L, R> {
    pub fn for_student(&self, student_id: &str) -> Vec<Attendance> {
        attendance_for_student(&self.snapshot(), student_id)
    }

    /// Share of attended days, `None` when nothing was recorded
    pub fn percentage_for(&self, student_id: &str) -> Option<f64> {
        attendance_percentage(&self.snapshot(), student_id)
    }

    pub fn register(&self, date: NaiveDate, class_name: &str) -> Vec<Attendance> {
        attendance_on(&self.snapshot(), date, class_name)
    }
}

impl<L: LocalStore<Salary>, R: RemoteSource<Salary>> EntityRepository<Salary, L, R> {
    pub fn for_teacher(&self, teacher_id: &str) -> Vec<Salary> {
        salaries_for_teacher(&self.snapshot(), teacher_id)
    }

    pub fn pending_total(&self) -> i64 {
        pending_salary_total(&self.snapshot())
    }
}

impl<L: LocalStore<Leave>, R: RemoteSource<Leave>> EntityRepository<Leave, L, R> {
    pub fn pending(&self) -> Vec<Leave> {
        pending_leaves(&self.snapshot())
    }

    pub fn for_requester(&self, requester_id: &str) -> Vec<Leave> {
        leaves_for_requester(&self.snapshot(), requester_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, Audience, FeeStatus};
    use crate::remote::{MemoryBackend, MemoryRemote, RemoteBackend};
    use crate::repository::SyncCursor;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn repo<T>(backend: &MemoryBackend) -> EntityRepository<T, MemoryStore<T>, MemoryRemote<T>>
    where
        T: crate::models::Syncable,
    {
        EntityRepository::new(MemoryStore::new(), backend.source(), SyncCursor::memory())
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    #[tokio::test]
    async fn fee_views_follow_synced_data() {
        let backend = MemoryBackend::new();
        let mut paid = Fee::new("s1", "2024-08", 5000);
        paid.status = FeeStatus::Paid;
        paid.amount_paid = 5000;
        backend.put(&paid).unwrap();
        backend.put(&Fee::new("s1", "2024-09", 5000)).unwrap();
        backend.put(&Fee::new("s2", "2024-09", 4000)).unwrap();

        let fees = repo::<Fee>(&backend);
        assert_eq!(fees.outstanding_for("s1"), 0);

        fees.refresh().await.unwrap();

        assert_eq!(fees.for_student("s1").len(), 2);
        assert_eq!(fees.outstanding_for("s1"), 5000);
        assert_eq!(fees.collected_in("2024-08"), 5000);
    }

    #[tokio::test]
    async fn attendance_views_cover_student_and_register() {
        let backend = MemoryBackend::new();
        backend
            .put(&Attendance::new("s1", "7A", date(2), AttendanceStatus::Present))
            .unwrap();
        backend
            .put(&Attendance::new("s1", "7A", date(3), AttendanceStatus::Absent))
            .unwrap();
        backend
            .put(&Attendance::new("s2", "7A", date(2), AttendanceStatus::Late))
            .unwrap();

        let attendance = repo::<Attendance>(&backend);
        attendance.refresh().await.unwrap();

        assert_eq!(attendance.for_student("s1").len(), 2);
        assert_eq!(attendance.percentage_for("s1"), Some(50.0));
        assert_eq!(attendance.percentage_for("nobody"), None);
        assert_eq!(attendance.register(date(2), "7a").len(), 2);
    }

    #[tokio::test]
    async fn local_writes_show_up_in_views_before_sync() {
        let backend = MemoryBackend::new();
        let homework = repo::<Homework>(&backend);

        homework
            .save_local(Homework::new("7A", "Science", "Plants", date(10), "t1"))
            .await
            .unwrap();

        assert_eq!(homework.for_class("7A").len(), 1);
        assert_eq!(homework.due_between(date(1), date(9)).len(), 0);
        assert_eq!(homework.unsynced().len(), 1);
    }

    #[tokio::test]
    async fn user_and_announcement_views() {
        let backend = MemoryBackend::new();
        backend
            .put(&User::new("Amina", "amina@alkhair.test", Role::Student).with_class("7A"))
            .unwrap();
        backend
            .put(&User::new("Yusuf", "yusuf@alkhair.test", Role::Teacher))
            .unwrap();
        backend
            .put(&Announcement::new("Staff meeting", "", Audience::Teachers, "a1"))
            .unwrap();

        let users = repo::<User>(&backend);
        let announcements = repo::<Announcement>(&backend);
        users.refresh().await.unwrap();
        announcements.refresh().await.unwrap();

        assert_eq!(users.students_in_class("7A").len(), 1);
        assert_eq!(users.with_role(Role::Teacher).len(), 1);
        assert!(users.by_email("yusuf@alkhair.test").is_some());
        assert!(announcements.for_role(Role::Student).is_empty());
        assert_eq!(announcements.for_role(Role::Teacher).len(), 1);
    }

    #[tokio::test]
    async fn leave_and_salary_views() {
        let backend = MemoryBackend::new();
        backend
            .put(&Leave::new("t1", date(4), date(5), "travel"))
            .unwrap();
        backend.put(&Salary::new("t1", "2024-09", 90_000)).unwrap();

        let leaves = repo::<Leave>(&backend);
        let salaries = repo::<Salary>(&backend);
        leaves.refresh().await.unwrap();
        salaries.refresh().await.unwrap();

        assert_eq!(leaves.pending().len(), 1);
        assert_eq!(leaves.for_requester("t1").len(), 1);
        assert_eq!(salaries.for_teacher("t1").len(), 1);
        assert_eq!(salaries.pending_total(), 90_000);
    }
}
