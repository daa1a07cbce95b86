use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LogItem {
    pub id: u32,
    pub item: String,
    pub quantity: String,
    pub unit_cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub submitted_at: DateTime<Utc>,
    pub weather: String,
    pub notes: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub labor: Vec<LogItem>,
    #[serde(default)]
    pub equipment: Vec<LogItem>,
    #[serde(default)]
    pub materials: Vec<LogItem>,
}

impl Entity for DailyLog {
    const KIND: EntityKind = EntityKind::DailyLog;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDailyLog {
    pub project_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub weather: String,
    pub notes: String,
    pub photos: Vec<String>,
    pub labor: Vec<LogItem>,
    pub equipment: Vec<LogItem>,
    pub materials: Vec<LogItem>,
}
