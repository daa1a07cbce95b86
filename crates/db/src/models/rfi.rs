use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::comment::{Attachment, Comment};
use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default)]
pub enum RfiStatus {
    #[default]
    Open,
    Closed,
    Draft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct RfiHistoryEvent {
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub change: String,
}

impl RfiHistoryEvent {
    pub fn now(author: impl Into<String>, change: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            author: author.into(),
            change: change.into(),
        }
    }
}

/// Request for information raised against a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Rfi {
    pub id: String,
    pub project_id: String,
    pub subject: String,
    pub question: String,
    pub status: RfiStatus,
    pub assignee: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub response: Option<String>,
    pub answered_by: Option<String>,
    #[serde(default)]
    pub response_attachments: Vec<Attachment>,
    pub created_by: String, // user id
    pub due_date_notified: bool,
    #[serde(default)]
    pub history: Vec<RfiHistoryEvent>,
}

impl Rfi {
    /// Open, not yet reminded, and due within `window_days` from `today` (inclusive).
    pub fn needs_due_reminder(&self, today: NaiveDate, window_days: i64) -> bool {
        if self.status != RfiStatus::Open || self.due_date_notified {
            return false;
        }
        let days_left = (self.due_date - today).num_days();
        (0..=window_days).contains(&days_left)
    }
}

impl Entity for Rfi {
    const KIND: EntityKind = EntityKind::Rfi;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateRfi {
    pub project_id: String,
    pub subject: String,
    pub question: String,
    pub status: Option<RfiStatus>,
    pub assignee: String,
    pub due_date: NaiveDate,
    pub attachments: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfi(due_date: NaiveDate) -> Rfi {
        Rfi {
            id: "rfi-x".into(),
            project_id: "proj-1".into(),
            subject: "Lintel size".into(),
            question: "Which lintel over door D4?".into(),
            status: RfiStatus::Open,
            assignee: "Structural Engineer".into(),
            due_date,
            attachments: vec![],
            comments: vec![],
            response: None,
            answered_by: None,
            response_attachments: vec![],
            created_by: "user-ss".into(),
            due_date_notified: false,
            history: vec![],
        }
    }

    #[test]
    fn due_reminder_window_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(rfi(today).needs_due_reminder(today, 2));
        assert!(rfi(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()).needs_due_reminder(today, 2));
        assert!(!rfi(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()).needs_due_reminder(today, 2));
        assert!(!rfi(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()).needs_due_reminder(today, 2));

        let mut notified = rfi(today);
        notified.due_date_notified = true;
        assert!(!notified.needs_due_reminder(today, 2));
    }
}
