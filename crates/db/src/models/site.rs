//! Company-wide reference lists shown on the site screens.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct SiteInstruction {
    pub id: String,
    pub text: String,
    pub author: String,
}

impl Entity for SiteInstruction {
    const KIND: EntityKind = EntityKind::SiteInstruction;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DeliveryItem {
    pub id: String,
    pub name: String,
    pub ordered: u32,
    pub received: u32,
}

impl Entity for DeliveryItem {
    const KIND: EntityKind = EntityKind::DeliveryItem;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        None
    }
}
