use super::model::{Product, ProductRequest, ProductResponse};
use super::observer::ProductObserver;
use super::repository::ProductRepository;
use crate::error::Result;
use std::sync::Arc;

/// Maps between transport shapes and the stored entity
///
/// Holds no state of its own; persistence failures pass through unchanged.
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    observer: Arc<dyn ProductObserver>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>, observer: Arc<dyn ProductObserver>) -> Self {
        Self {
            repository,
            observer,
        }
    }

    /// Store a new product built from `request`
    ///
    /// The stored product is returned so the transport layer can decide
    /// whether to disclose its id.
    pub async fn create(&self, request: ProductRequest) -> Result<ProductResponse> {
        let product = Product::from(request);
        let stored = self.repository.insert(product).await?;
        self.observer.on_created(&stored);
        Ok(stored.into())
    }

    /// Every stored product, in the order the store yields them
    pub async fn list_all(&self) -> Result<Vec<ProductResponse>> {
        let products = self.repository.find_all().await?;
        Ok(products.into_iter().map(ProductResponse::from).collect())
    }

    pub async fn delete_all(&self) -> Result<u64> {
        Ok(self.repository.delete_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::product::repository::DocumentProductRepository;
    use crate::store::{self, MemoryStore, StoreError};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        seen: Mutex<Vec<Product>>,
    }

    impl ProductObserver for RecordingObserver {
        fn on_created(&self, product: &Product) {
            self.seen.lock().unwrap().push(product.clone());
        }
    }

    struct BrokenRepository;

    #[async_trait]
    impl ProductRepository for BrokenRepository {
        async fn insert(&self, _product: Product) -> store::Result<Product> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn find_all(&self) -> store::Result<Vec<Product>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn delete_all(&self) -> store::Result<u64> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    fn request(name: &str, description: &str, price: &str) -> ProductRequest {
        ProductRequest {
            name: name.to_string(),
            description: description.to_string(),
            price: Decimal::from_str(price).unwrap(),
        }
    }

    fn service() -> (ProductService, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let repository = Arc::new(DocumentProductRepository::new(Arc::new(MemoryStore::new())));
        (ProductService::new(repository, observer.clone()), observer)
    }

    #[tokio::test]
    async fn create_then_list_returns_the_product() {
        let (service, _) = service();
        let req = request("sample-product-1", "This is the first sample product", "1.0");

        let created = service.create(req.clone()).await.unwrap();
        let all = service.list_all().await.unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0], created);
        assert!(!all[0].id.is_empty());
        assert_eq!(all[0].name, req.name);
        assert_eq!(all[0].description, req.description);
        assert_eq!(all[0].price, req.price);
    }

    #[tokio::test]
    async fn n_creates_list_n() {
        let (service, _) = service();
        for i in 0..5 {
            service
                .create(request(&format!("p{i}"), "", &format!("{i}.25")))
                .await
                .unwrap();
        }
        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 5);

        let mut ids: Vec<_> = all.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn delete_all_empties_the_catalog() {
        let (service, _) = service();
        assert_eq!(service.delete_all().await.unwrap(), 0);

        service.create(request("a", "", "1")).await.unwrap();
        service.create(request("b", "", "2")).await.unwrap();
        assert_eq!(service.delete_all().await.unwrap(), 2);
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let (service, _) = service();
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn observer_sees_stored_product_only_on_success() {
        let (service, observer) = service();
        service.create(request("lamp", "desk lamp", "19.99")).await.unwrap();

        let seen = observer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].id.is_some());
        assert_eq!(seen[0].name, "lamp");
        drop(seen);

        let failing_observer = Arc::new(RecordingObserver::default());
        let broken = ProductService::new(Arc::new(BrokenRepository), failing_observer.clone());
        let err = broken.create(request("x", "", "1")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Store(StoreError::Unavailable(_))));
        assert!(failing_observer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn persistence_failures_propagate() {
        let service = ProductService::new(
            Arc::new(BrokenRepository),
            Arc::new(RecordingObserver::default()),
        );
        assert!(service.list_all().await.is_err());
        assert!(service.delete_all().await.is_err());
    }
}
