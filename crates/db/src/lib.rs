use std::sync::Arc;

use store::{Entity, MemoryStore, Placement, Store, StoreError};
use tracing::debug;

pub mod models;
pub mod seed;
pub mod store;

/// Typed access to the injected store.
#[derive(Clone, Debug)]
pub struct DBService {
    store: Arc<dyn Store>,
}

impl DBService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// In-memory store loaded with the demo tenant.
    pub async fn seeded() -> Result<Self, StoreError> {
        let db = Self::in_memory();
        seed::seed(&db).await?;
        Ok(db)
    }

    pub async fn find_all<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        let kind = T::KIND;
        let rows = self.store.rows(kind).await?;
        debug!(%kind, count = rows.len(), "loaded rows");
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }

    pub async fn find_by_id<T: Entity>(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.store.row(T::KIND, id).await? {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_scope<T: Entity>(&self, scope_id: &str) -> Result<Vec<T>, StoreError> {
        self.find_where(|row: &T| row.scope_id() == Some(scope_id))
            .await
    }

    pub async fn find_where<T, F>(&self, predicate: F) -> Result<Vec<T>, StoreError>
    where
        T: Entity,
        F: Fn(&T) -> bool + Send,
    {
        let mut rows = self.find_all::<T>().await?;
        rows.retain(|row| predicate(row));
        Ok(rows)
    }

    pub async fn insert<T: Entity>(&self, row: &T) -> Result<(), StoreError> {
        self.insert_at(row, Placement::Back).await
    }

    pub async fn insert_front<T: Entity>(&self, row: &T) -> Result<(), StoreError> {
        self.insert_at(row, Placement::Front).await
    }

    async fn insert_at<T: Entity>(&self, row: &T, placement: Placement) -> Result<(), StoreError> {
        let value = serde_json::to_value(row)?;
        self.store
            .insert(T::KIND, row.id().to_string(), value, placement)
            .await
    }

    /// Replace the stored row with the same id. Returns false if none exists.
    pub async fn update<T: Entity>(&self, row: &T) -> Result<bool, StoreError> {
        let value = serde_json::to_value(row)?;
        self.store.replace(T::KIND, row.id(), value).await
    }
}
