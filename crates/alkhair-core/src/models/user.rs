//! User model

use serde::{Deserialize, Serialize};

use super::syncable::{impl_syncable, new_record_id};
use crate::util::unix_millis_now;

/// Dashboard role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

/// A school user (admin, teacher or student)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Class the student belongs to
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    #[serde(skip_serializing, default)]
    pub is_synced: bool,
}

impl_syncable!(User, "users");

impl User {
    /// Create a new, not yet synced user
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: new_record_id(),
            name: name.into(),
            email: email.into(),
            role,
            class_name: None,
            phone: None,
            updated_at: unix_millis_now(),
            is_synced: false,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

/// Users holding the given role
pub fn users_with_role(users: &[User], role: Role) -> Vec<User> {
    users.iter().filter(|user| user.role == role).cloned().collect()
}

/// Students enrolled in a class, sorted by name
pub fn students_in_class(users: &[User], class_name: &str) -> Vec<User> {
    let mut students: Vec<User> = users
        .iter()
        .filter(|user| {
            user.role == Role::Student
                && user
                    .class_name
                    .as_deref()
                    .is_some_and(|class| class.eq_ignore_ascii_case(class_name))
        })
        .cloned()
        .collect();
    students.sort_by(|a, b| a.name.cmp(&b.name));
    students
}

/// Case-insensitive lookup by email
pub fn find_user_by_email<'a>(users: &'a [User], email: &str) -> Option<&'a User> {
    let email = email.trim();
    users
        .iter()
        .find(|user| user.email.eq_ignore_ascii_case(email))
}
