use async_trait::async_trait;
use futures::TryStreamExt;
use log::info;
use mongodb::{
    bson::{
        doc,
        Bson,
        Document,
    },
    options::{
        ClientOptions,
        ServerApi,
        ServerApiVersion
    },
};

use super::{
    DocumentStore, StoreError,
};

pub async fn mongodb_setup(
    uri: &str,
) -> anyhow::Result<mongodb::Client> {
    info!("Connecting to the MongoDB daemon...");
    let mut client_options = ClientOptions::parse(
        uri
    ).await?;
    let server_api = ServerApi::builder().version(
        ServerApiVersion::V1
    ).build();
    client_options.server_api = Some(server_api);
    client_options.app_name = Some("studio".to_string());
    let client = mongodb::Client::with_options(client_options)?;
    // Send a ping to confirm a successful connection
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    info!("Successfully connected to the MongoDB instance!");
    Ok(client)
}

pub struct MongoStore {
    db: mongodb::Database,
}

impl MongoStore {
    pub fn new(client: &mongodb::Client, db_name: &str) -> Self {
        Self {
            db: client.database(db_name),
        }
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_tag(&self) -> &'static str {
        "mongodb"
    }

    #[tracing::instrument(skip(self, record))]
    async fn insert(
        &self,
        collection: &str,
        record: Document,
    ) -> Result<Bson, StoreError> {
        let oid = self.collection(collection)
            .insert_one(record)
            .await?
            .inserted_id;
        Ok(oid)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(
        &self,
        collection: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(collection)
            .find(doc! {})
            .await?;
        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.db.list_collection_names().await?)
    }
}
