use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeedbackVote {
    Up,
    Down,
}

/// Thumbs up/down recorded against an AI suggestion card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AiFeedback {
    pub id: String,
    pub suggestion_title: String,
    pub suggestion_reason: String,
    pub feedback: FeedbackVote,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
}

impl Entity for AiFeedback {
    const KIND: EntityKind = EntityKind::AiFeedback;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}
