//! Posture Record Access Service

use storage::{NewPostureRecord, PostureRecord, PostureStore, StorageError};
use tracing::debug;

/// Mediates between the HTTP handlers and the store without altering records
#[derive(Debug, Clone)]
pub struct PostureService {
    store: PostureStore,
}

impl PostureService {
    pub fn new(store: PostureStore) -> Self {
        Self { store }
    }

    /// Get all stored records
    pub async fn get_all_records(&self) -> Result<Vec<PostureRecord>, StorageError> {
        let records = self.store.list_all().await?;
        debug!("Loaded {} posture records", records.len());
        Ok(records)
    }

    /// Save a new record
    pub async fn save_record(&self, record: NewPostureRecord) -> Result<PostureRecord, StorageError> {
        self.store.insert(record).await
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &PostureStore {
        &self.store
    }
}
