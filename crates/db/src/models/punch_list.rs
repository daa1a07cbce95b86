use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::comment::Comment;
use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default)]
pub enum PunchListStatus {
    #[default]
    Open,
    #[serde(rename = "Ready for Review")]
    #[strum(serialize = "Ready for Review")]
    ReadyForReview,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PunchListItem {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub status: PunchListStatus,
    pub assignee: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Entity for PunchListItem {
    const KIND: EntityKind = EntityKind::PunchListItem;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatePunchListItem {
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub assignee: String,
    pub photos: Vec<String>,
}
