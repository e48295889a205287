use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use mongodb::bson::{
    self,
    Bson,
    Document,
};
use serde_json::Value;

use crate::config::StoreSettings;

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::{
    mongodb_setup,
    MongoStore,
};

// the field the store keeps its own identifier in
pub const RAW_ID_FIELD: &str = "_id";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database is not initialized")]
    Unavailable,

    #[error("database error: {0}")]
    Backend(String),

    #[error("could not encode record: {0}")]
    Encode(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(e: bson::ser::Error) -> Self {
        StoreError::Encode(e.to_string())
    }
}

/// Collection-oriented persistence the handlers talk to.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn insert(
        &self,
        collection: &str,
        record: Document,
    ) -> Result<Bson, StoreError>;

    // documents come back with their raw `_id`
    async fn find_all(
        &self,
        collection: &str,
    ) -> Result<Vec<Document>, StoreError>;

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError>;
}

/// Builds the store the service runs against; `None` means unavailable.
pub async fn open(
    settings: &StoreSettings,
    in_memory: bool,
) -> Option<Arc<dyn DocumentStore>> {
    if true == in_memory {
        warn!("Using the in-memory store, records are lost on exit.");
        return Some(Arc::new(MemoryStore::new()));
    }
    let (Some(url), Some(db_name)) = (
        settings.database_url.as_deref(),
        settings.database_name.as_deref(),
    ) else {
        warn!("`DATABASE_URL` or `DATABASE_NAME` is not set, running without a database.");
        return None;
    };
    match mongodb_setup(url).await {
        Ok(client) => Some(Arc::new(MongoStore::new(&client, db_name))),

        Err(e) => {
            warn!("MongoDB setup failed, running without a database: `{e:?}`");
            None
        }
    }
}

// stamps creation/update times onto a record about to be inserted
pub fn stamp(record: &mut Document) {
    let now = bson::DateTime::from_millis(Utc::now().timestamp_millis());
    record.insert("created_at", now);
    record.insert("updated_at", now);
}

/// Public string form of a store identifier.
pub fn id_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// renders a stored document as json, `_id` becomes a string `id`
pub fn to_public_json(mut doc: Document) -> Value {
    let id = doc.remove(RAW_ID_FIELD);
    let mut object = serde_json::Map::new();
    for (key, value) in doc {
        object.insert(key, bson_to_json(value));
    }
    if let Some(id) = id {
        object.insert("id".to_string(), Value::String(id_string(&id)));
    }
    Value::Object(object)
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(k, v)| (k, bson_to_json(v)))
                .collect()
        ),
        Bson::Array(items) => Value::Array(
            items.into_iter()
                .map(bson_to_json)
                .collect()
        ),
        other => other.into_relaxed_extjson(),
    }
}
