//! Document store
//!
//! Products are persisted as schema-free JSON documents grouped into named
//! collections. The store assigns every document an `_id` on insert; nothing
//! else about a document is interpreted here.
//!
//! Backends are selected by URI (see [`open_store`]):
//!
//! - `memory://` — [`MemoryStore`], process-local, lost on restart
//! - `file://<dir>` — [`FileStore`], one JSON-lines file per collection
//! - `mongodb://...` or `mongodb+srv://...` — [`MongoStore`]

mod collection;
mod file;
mod memory;
mod mongo;

pub use collection::Collection;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::config::ConfigError;
use crate::lifecycle::{OnModuleDestroy, OnModuleInit};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// A stored document: a JSON object
pub type Document = Map<String, Value>;

/// Name of the identifier field every stored document carries
pub const ID_FIELD: &str = "_id";

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on collection {collection}: {source}")]
    Io {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode document from {collection}: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt document in {collection} at line {line}: {message}")]
    Corrupt {
        collection: String,
        line: usize,
        message: String,
    },

    #[error("Driver error on collection {collection}: {source}")]
    Driver {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Invalid collection name: {0:?}")]
    InvalidCollection(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Operations the catalog needs from a document store
///
/// Each call is atomic per document; there are no cross-document
/// transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `document` into `collection`, assigning a fresh `_id`
    ///
    /// Any `_id` already present in `document` is replaced.
    async fn insert(&self, collection: &str, document: Document) -> Result<Document>;

    /// All documents of `collection`, in insertion order
    ///
    /// A collection that was never written to is empty, not an error.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Remove every document of `collection`, returning how many were removed
    async fn delete_all(&self, collection: &str) -> Result<u64>;
}

/// Attach a freshly generated `_id` to `document`
pub(crate) fn assign_id(mut document: Document) -> Document {
    document.insert(
        ID_FIELD.to_string(),
        Value::String(uuid::Uuid::new_v4().to_string()),
    );
    document
}

/// A store opened from configuration, with the lifecycle hooks it needs
pub struct OpenedStore {
    pub store: Arc<dyn DocumentStore>,
    pub init: Option<Arc<dyn OnModuleInit>>,
    pub destroy: Option<Arc<dyn OnModuleDestroy>>,
}

/// Open the backend named by `uri`
///
/// Accepted forms are `memory://`, `file://<directory>` and MongoDB
/// connection strings. Nothing is connected here; that happens in the
/// returned init hook.
pub fn open_store(uri: &str) -> std::result::Result<OpenedStore, ConfigError> {
    if uri == "memory://" || uri == "memory" {
        return Ok(OpenedStore {
            store: Arc::new(MemoryStore::new()),
            init: None,
            destroy: None,
        });
    }

    if let Some(path) = uri.strip_prefix("file://") {
        if path.is_empty() {
            return Err(ConfigError::UnsupportedStore(uri.to_string()));
        }
        let store = Arc::new(FileStore::new(PathBuf::from(path)));
        return Ok(OpenedStore {
            store: store.clone(),
            init: Some(store.clone()),
            destroy: Some(store),
        });
    }

    if uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://") {
        let store = Arc::new(MongoStore::new(uri));
        return Ok(OpenedStore {
            store: store.clone(),
            init: Some(store.clone()),
            destroy: Some(store),
        });
    }

    Err(ConfigError::UnsupportedStore(uri.to_string()))
}
