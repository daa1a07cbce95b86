//! Storage seam behind `DBService`.
//!
//! Rows are kept as JSON documents keyed by entity kind and id so any backend
//! that can store a document can stand in for the in-memory one.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Company,
    User,
    Project,
    Task,
    Rfi,
    PunchListItem,
    Drawing,
    Document,
    DayworkSheet,
    DayworkLedgerEntry,
    DailyLog,
    SiteInstruction,
    DeliveryItem,
    Notification,
    ActivityEvent,
    AiFeedback,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{kind} {id} already exists")]
    Duplicate { kind: EntityKind, id: String },
}

/// A row type that lives in the store.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Owning project for project-scoped rows, owning company for projects and users.
    fn scope_id(&self) -> Option<&str>;
}

/// Where a new row goes in its table's listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Back,
    /// Newest-first feeds (notifications, activity, drawings).
    Front,
}

#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Every row of `kind`, in listing order, read under one snapshot.
    async fn rows(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError>;

    async fn row(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, StoreError>;

    async fn insert(
        &self,
        kind: EntityKind,
        id: String,
        row: Value,
        placement: Placement,
    ) -> Result<(), StoreError>;

    /// Returns false when no row with `id` exists.
    async fn replace(&self, kind: EntityKind, id: &str, row: Value) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<EntityKind, Vec<(String, Value)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn rows(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&kind)
            .map(|table| table.iter().map(|(_, row)| row.clone()).collect())
            .unwrap_or_default())
    }

    async fn row(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&kind)
            .and_then(|table| table.iter().find(|(row_id, _)| row_id == id))
            .map(|(_, row)| row.clone()))
    }

    async fn insert(
        &self,
        kind: EntityKind,
        id: String,
        row: Value,
        placement: Placement,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(kind).or_default();
        if table.iter().any(|(row_id, _)| *row_id == id) {
            return Err(StoreError::Duplicate { kind, id });
        }
        match placement {
            Placement::Back => table.push((id, row)),
            Placement::Front => table.insert(0, (id, row)),
        }
        Ok(())
    }

    async fn replace(&self, kind: EntityKind, id: &str, row: Value) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(slot) = tables
            .get_mut(&kind)
            .and_then(|table| table.iter_mut().find(|(row_id, _)| row_id == id))
        else {
            return Ok(false);
        };
        slot.1 = row;
        Ok(true)
    }
}
