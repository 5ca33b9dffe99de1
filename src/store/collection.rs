use super::{Document, DocumentStore, Result, StoreError};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed view of one named collection
///
/// `T` is encoded to a JSON object on the way in and decoded on the way out;
/// its identifier must serialize as `_id` and be skipped while unset so the
/// store can assign it.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// Insert `value`, returning it as stored (with its assigned id)
    pub async fn insert(&self, value: &T) -> Result<T> {
        let document = match serde_json::to_value(value).map_err(StoreError::Encode)? {
            Value::Object(document) => document,
            other => {
                return Err(StoreError::Encode(<serde_json::Error as serde::ser::Error>::custom(
                    format!("expected an object, got {other}"),
                )));
            }
        };
        let stored = self.store.insert(&self.name, document).await?;
        self.decode(stored)
    }

    pub async fn find_all(&self) -> Result<Vec<T>> {
        self.store
            .find_all(&self.name)
            .await?
            .into_iter()
            .map(|document| self.decode(document))
            .collect()
    }

    pub async fn delete_all(&self) -> Result<u64> {
        self.store.delete_all(&self.name).await
    }

    fn decode(&self, document: Document) -> Result<T> {
        serde_json::from_value(Value::Object(document)).map_err(|source| StoreError::Decode {
            collection: self.name.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        text: String,
    }

    #[tokio::test]
    async fn typed_round_trip_through_store() {
        let notes: Collection<Note> = Collection::new(Arc::new(MemoryStore::new()), "note");

        let stored = notes
            .insert(&Note {
                id: None,
                text: "hello".into(),
            })
            .await
            .unwrap();
        assert!(stored.id.is_some());

        let all = notes.find_all().await.unwrap();
        assert_eq!(all, vec![stored]);
        assert_eq!(notes.delete_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn non_object_values_are_rejected() {
        let numbers: Collection<u32> = Collection::new(Arc::new(MemoryStore::new()), "n");
        let err = numbers.insert(&7).await.unwrap_err();
        assert!(matches!(err, StoreError::Encode(_)));
    }

    #[tokio::test]
    async fn undecodable_documents_surface_as_errors() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let mut raw = Document::new();
        raw.insert("unexpected".into(), Value::Bool(true));
        store.insert("note", raw).await.unwrap();

        let notes: Collection<Note> = Collection::new(store, "note");
        let err = notes.find_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
