use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub open_rfis: u32,
    pub overdue_tasks: u32,
    pub pending_tm_tickets: u32,
    pub ai_risk_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ProjectContact {
    pub role: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub location: String,
    pub image: String,
    pub description: String,
    pub contacts: Vec<ProjectContact>,
    pub snapshot: ProjectSnapshot,
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.company_id)
    }
}
