use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default)]
pub enum DayworkStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DayworkSheetItem {
    pub id: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub rate: f64,
}

/// Time-and-materials ticket for work outside the contract scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DayworkSheet {
    pub id: String,
    pub project_id: String,
    pub ticket_number: String,
    pub date: NaiveDate,
    pub contractor: String,
    pub description: String,
    pub status: DayworkStatus,
    #[serde(default)]
    pub items: Vec<DayworkSheetItem>,
    pub approved_by: Option<String>,
    pub approved_date: Option<DateTime<Utc>>,
}

impl DayworkSheet {
    /// `T&M-001`, `T&M-002`, ... numbered per project.
    pub fn ticket_number(existing_in_project: usize) -> String {
        format!("T&M-{:03}", existing_in_project + 1)
    }
}

impl Entity for DayworkSheet {
    const KIND: EntityKind = EntityKind::DayworkSheet;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

/// Copy of a sheet taken at approval time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DayworkLedgerEntry {
    pub id: String,
    pub sheet: DayworkSheet,
}

impl Entity for DayworkLedgerEntry {
    const KIND: EntityKind = EntityKind::DayworkLedgerEntry;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.sheet.project_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDayworkSheet {
    pub project_id: String,
    pub date: NaiveDate,
    pub contractor: String,
    pub description: String,
}
