use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::route::{Link, Route};
use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub link: Link,
}

impl Notification {
    pub fn unread(id: String, message: impl Into<String>, link: Link) -> Self {
        Self {
            id,
            message: message.into(),
            timestamp: Utc::now(),
            read: false,
            link,
        }
    }
}

impl Entity for Notification {
    const KIND: EntityKind = EntityKind::Notification;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        self.link.project_id.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityKind {
    StatusChange,
    Comment,
    Photo,
    LogSubmitted,
}

/// Entry in the company activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub author: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub project_id: String,
    pub project_name: String,
    pub link: Route,
}

impl ActivityEvent {
    /// Link that reopens the event's target inside its project.
    pub fn deep_link(&self) -> Link {
        Link::in_project(self.project_id.clone(), self.link.clone())
    }
}

impl Entity for ActivityEvent {
    const KIND: EntityKind = EntityKind::ActivityEvent;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}
