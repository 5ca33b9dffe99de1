use super::model::Product;
use crate::store::{Collection, DocumentStore, Result, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// Collection products are stored in
pub const PRODUCT_COLLECTION: &str = "product";

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Store `product`, returning it with its assigned id
    async fn insert(&self, product: Product) -> Result<Product>;
    async fn find_all(&self) -> Result<Vec<Product>>;
    /// Remove every product, returning how many were removed
    async fn delete_all(&self) -> Result<u64>;
}

/// [`ProductRepository`] over a [`DocumentStore`]
pub struct DocumentProductRepository {
    products: Collection<Product>,
}

impl DocumentProductRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            products: Collection::new(store, PRODUCT_COLLECTION),
        }
    }
}

#[async_trait]
impl ProductRepository for DocumentProductRepository {
    async fn insert(&self, product: Product) -> Result<Product> {
        let stored = self.products.insert(&product).await?;
        if stored.id.is_none() {
            return Err(StoreError::Unavailable(
                "store did not assign an id to the inserted product".to_string(),
            ));
        }
        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        self.products.find_all().await
    }

    async fn delete_all(&self) -> Result<u64> {
        self.products.delete_all().await
    }
}
