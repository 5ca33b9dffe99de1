use super::{Document, DocumentStore, Result, StoreError, assign_id};
use crate::lifecycle::{LifecycleError, OnModuleDestroy, OnModuleInit};
use async_trait::async_trait;
use mongodb::bson::{self, Bson, doc};
use mongodb::{Client, Database};
use serde_json::Value;
use tokio::sync::RwLock;

const FALLBACK_DATABASE: &str = "catalog";

/// MongoDB-backed document store
///
/// Documents keep the store-assigned string `_id`, so they read back the same
/// way as from the other backends. The client is connected by the init hook
/// and shut down by the destroy hook; outside that window every operation is
/// `Unavailable`.
pub struct MongoStore {
    uri: String,
    connection: RwLock<Option<(Client, Database)>>,
}

impl MongoStore {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            connection: RwLock::new(None),
        }
    }

    async fn database(&self) -> Result<Database> {
        match self.connection.read().await.as_ref() {
            Some((_, database)) => Ok(database.clone()),
            None => Err(StoreError::Unavailable(
                "mongodb store is not connected".to_string(),
            )),
        }
    }
}

fn driver_err(collection: &str) -> impl FnOnce(mongodb::error::Error) -> StoreError + '_ {
    move |source| StoreError::Driver {
        collection: collection.to_string(),
        source,
    }
}

/// JSON to BSON; integers stay integral, other numbers become doubles
fn to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Bson::Double(f)
            } else {
                Bson::String(n.to_string())
            }
        }
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(to_bson).collect()),
        Value::Object(map) => Bson::Document(to_bson_document(map)),
    }
}

fn to_bson_document(document: Document) -> bson::Document {
    document
        .into_iter()
        .map(|(key, value)| (key, to_bson(value)))
        .collect()
}

fn from_bson_document(document: bson::Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect()
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        let database = self.database().await?;
        let document = assign_id(document);

        database
            .collection::<bson::Document>(collection)
            .insert_one(to_bson_document(document.clone()))
            .await
            .map_err(driver_err(collection))?;

        Ok(document)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let database = self.database().await?;
        let mut cursor = database
            .collection::<bson::Document>(collection)
            .find(doc! {})
            .await
            .map_err(driver_err(collection))?;

        let mut documents = Vec::new();
        while cursor.advance().await.map_err(driver_err(collection))? {
            let raw = cursor
                .deserialize_current()
                .map_err(driver_err(collection))?;
            documents.push(from_bson_document(raw));
        }
        Ok(documents)
    }

    async fn delete_all(&self, collection: &str) -> Result<u64> {
        let database = self.database().await?;
        let result = database
            .collection::<bson::Document>(collection)
            .delete_many(doc! {})
            .await
            .map_err(driver_err(collection))?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl OnModuleInit for MongoStore {
    async fn on_module_init(&self) -> std::result::Result<(), LifecycleError> {
        let client = Client::with_uri_str(&self.uri)
            .await
            .map_err(|e| LifecycleError::init_failed(format!("invalid mongodb uri: {e}")))?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DATABASE));

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| LifecycleError::init_failed(format!("mongodb ping failed: {e}")))?;

        tracing::info!("MongoDB store: connected to database {}", database.name());
        *self.connection.write().await = Some((client, database));
        Ok(())
    }
}

#[async_trait]
impl OnModuleDestroy for MongoStore {
    async fn on_module_destroy(&self) -> std::result::Result<(), LifecycleError> {
        let Some((client, _)) = self.connection.write().await.take() else {
            return Ok(());
        };
        client.shutdown().await;
        tracing::info!("MongoDB store: disconnected");
        Ok(())
    }
}
