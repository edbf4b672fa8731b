//! Announcement model

use serde::{Deserialize, Serialize};

use super::syncable::{impl_syncable, new_record_id};
use super::user::Role;
use crate::util::unix_millis_now;

/// Who an announcement is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    All,
    Teachers,
    Students,
}

impl Audience {
    /// Whether a user with `role` should see announcements for this audience
    pub const fn includes(self, role: Role) -> bool {
        match self {
            Self::All => true,
            Self::Teachers => matches!(role, Role::Teacher | Role::Admin),
            Self::Students => matches!(role, Role::Student | Role::Admin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub audience: Audience,
    pub author_id: String,
    pub updated_at: i64,
    #[serde(skip_serializing, default)]
    pub is_synced: bool,
}

impl_syncable!(Announcement, "announcements");

impl Announcement {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        audience: Audience,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            id: new_record_id(),
            title: title.into(),
            body: body.into(),
            audience,
            author_id: author_id.into(),
            updated_at: unix_millis_now(),
            is_synced: false,
        }
    }
}

/// Announcements visible to `role`, newest first
pub fn announcements_for_role(announcements: &[Announcement], role: Role) -> Vec<Announcement> {
    let mut visible: Vec<Announcement> = announcements
        .iter()
        .filter(|announcement| announcement.audience.includes(role))
        .cloned()
        .collect();
    visible.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    visible
}
