use std::collections::BTreeMap;

use async_trait::async_trait;
use mongodb::bson::{
    oid::ObjectId,
    Bson,
    Document,
};
use tokio::sync::Mutex;

use super::{
    DocumentStore, StoreError, RAW_ID_FIELD,
};

// in-process store for local development and tests, insertion ordered
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn insert(
        &self,
        collection: &str,
        mut record: Document,
    ) -> Result<Bson, StoreError> {
        let id = record
            .get(RAW_ID_FIELD)
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));
        record.insert(RAW_ID_FIELD, id.clone());
        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(record);
        Ok(id)
    }

    async fn find_all(
        &self,
        collection: &str,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(
            self.collections
                .lock()
                .await
                .get(collection)
                .cloned()
                .unwrap_or_default()
        )
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.collections.lock().await.keys().cloned().collect())
    }
}
