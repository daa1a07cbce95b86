use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
    pub id: String,
    pub project_id: String,
    pub number: String,
    pub title: String,
    pub revision: u32,
    pub date: NaiveDate,
    pub url: String,
}

impl Entity for Drawing {
    const KIND: EntityKind = EntityKind::Drawing;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

/// Upload metadata; file storage is not modelled, so every drawing points at the sample sheet.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDrawing {
    pub number: String,
    pub title: String,
    pub revision: u32,
    pub date: NaiveDate,
    pub file_name: String,
}

pub const SAMPLE_DRAWING_URL: &str = "/sample.pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub url: String,
    pub uploaded_at: NaiveDate,
}

impl Entity for Document {
    const KIND: EntityKind = EntityKind::Document;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}
