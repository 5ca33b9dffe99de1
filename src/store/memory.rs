use super::{Document, DocumentStore, Result, assign_id};
use async_trait::async_trait;
use dashmap::DashMap;

/// In-process document store
///
/// Collections are created on first insert.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        let document = assign_id(document);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.clone())
            .unwrap_or_default())
    }

    async fn delete_all(&self, collection: &str) -> Result<u64> {
        let removed = self
            .collections
            .remove(collection)
            .map(|(_, docs)| docs.len() as u64)
            .unwrap_or(0);
        Ok(removed)
    }
}
