use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Comment {
    pub fn new(author: impl Into<String>, text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: utils::id::new_id("c"),
            author: author.into(),
            timestamp: Utc::now(),
            text: text.into(),
            attachments,
        }
    }
}
