//! Application Bootstrap
//!
//! Explicit composition root: the store is opened from configuration, handed
//! to the repository, the repository to the service, the service to the
//! controller. Nothing is resolved from global state.

use crate::config::{AppConfig, CreateResponseMode};
use crate::error::{CatalogError, Result};
use crate::interceptor::log_requests;
use crate::lifecycle::{LifecycleManager, shutdown_signal};
use crate::product::{
    DocumentProductRepository, LoggingObserver, ProductController, ProductObserver,
    ProductService,
};
use crate::store::{DocumentStore, open_store};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Build the full HTTP surface over `store`
pub fn build_router(
    store: Arc<dyn DocumentStore>,
    observer: Arc<dyn ProductObserver>,
    create_mode: CreateResponseMode,
) -> Router {
    let repository = Arc::new(DocumentProductRepository::new(store));
    let service = Arc::new(ProductService::new(repository, observer));
    let controller = Arc::new(ProductController::new(service, create_mode));

    Router::new()
        .route("/health", get(health_check))
        .merge(ProductController::router(controller))
        .layer(middleware::from_fn(log_requests))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// A composed, initialized service ready to serve
pub struct Application {
    config: AppConfig,
    router: Router,
    lifecycle: LifecycleManager,
}

impl Application {
    /// Open the configured store, run its init hooks and compose the router
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        let opened = open_store(&config.store_uri)?;

        let mut lifecycle = LifecycleManager::new();
        if let Some(init) = opened.init {
            lifecycle.register_init(init, "DocumentStore");
        }
        if let Some(destroy) = opened.destroy {
            lifecycle.register_destroy(destroy, "DocumentStore");
        }
        tracing::debug!(
            init_hooks = lifecycle.init_hook_count(),
            destroy_hooks = lifecycle.destroy_hook_count(),
            "Running module init hooks"
        );
        lifecycle
            .call_module_init_with_timeout(config.init_timeout)
            .await?;

        let router = build_router(
            opened.store,
            Arc::new(LoggingObserver),
            config.create_response,
        );

        tracing::info!(
            store = %config.store_uri,
            create_response = %config.create_response,
            "Application initialized"
        );

        Ok(Self {
            config,
            router,
            lifecycle,
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until a shutdown signal arrives, then release resources
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| CatalogError::Bind {
                addr: addr.clone(),
                source,
            })?;
        tracing::info!("Product catalog listening on http://{}", addr);

        if let Err(e) = axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            tracing::error!("Server error: {}", e);
        }

        tracing::info!("Initiating graceful shutdown...");
        self.shutdown().await
    }

    /// Run destroy hooks
    pub async fn shutdown(&self) -> Result<()> {
        self.lifecycle.call_module_destroy().await?;
        tracing::info!("Shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductResponse;
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
        response::Response,
    };
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tower::ServiceExt;

    fn app(mode: CreateResponseMode) -> Router {
        build_router(Arc::new(MemoryStore::new()), Arc::new(LoggingObserver), mode)
    }

    async fn send(app: &Router, method: Method, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri("/api/product");
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn list(app: &Router) -> Vec<ProductResponse> {
        let response = send(app, Method::GET, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn sample(n: u32) -> Value {
        json!({
            "name": format!("sample-product-{n}"),
            "description": format!("This is sample product {n}"),
            "price": n as f64,
        })
    }

    #[tokio::test]
    async fn create_single_product() {
        let app = app(CreateResponseMode::Empty);
        let response = send(
            &app,
            Method::POST,
            Some(json!({
                "name": "sample-product-1",
                "description": "This is the first sample product",
                "price": 1.0
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(header::LOCATION).is_none());
        assert!(body_bytes(response).await.is_empty());

        let products = list(&app).await;
        assert_eq!(products.len(), 1);
        assert!(!products[0].id.is_empty());
        assert_eq!(products[0].name, "sample-product-1");
        assert_eq!(products[0].description, "This is the first sample product");
        assert_eq!(products[0].price, Decimal::from_str("1.0").unwrap());
    }

    #[tokio::test]
    async fn two_creates_then_delete_all() {
        let app = app(CreateResponseMode::Empty);
        for n in 1..=2 {
            let response = send(&app, Method::POST, Some(sample(n))).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }
        assert_eq!(list(&app).await.len(), 2);

        let response = send(&app, Method::DELETE, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_bytes(response).await.is_empty());

        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn delete_on_empty_catalog_is_ok() {
        let app = app(CreateResponseMode::Empty);
        let response = send(&app, Method::DELETE, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn price_keeps_full_precision() {
        let app = app(CreateResponseMode::Empty);
        send(
            &app,
            Method::POST,
            Some(json!({"name": "sample-product", "description": "sample-product", "price": 123.321})),
        )
        .await;

        let products = list(&app).await;
        assert_eq!(products[0].price.to_string(), "123.321");
    }

    #[tokio::test]
    async fn price_beyond_f64_precision_is_stored_exactly() {
        let app = app(CreateResponseMode::Empty);
        // Raw body text: going through `json!` would round the number to f64 first.
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/product")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"name":"sample-product","description":"wide","price":12345678901234567.89}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let products = list(&app).await;
        assert_eq!(products[0].price.to_string(), "12345678901234567.89");
    }

    #[tokio::test]
    async fn created_mode_returns_id_and_location() {
        let app = app(CreateResponseMode::Created);
        let response = send(&app, Method::POST, Some(sample(7))).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let created: ProductResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(location, format!("/api/product/{}", created.id));

        let products = list(&app).await;
        assert_eq!(products, vec![created]);
    }

    #[tokio::test]
    async fn malformed_body_is_a_client_error() {
        let app = app(CreateResponseMode::Empty);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/product")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());

        let response = send(&app, Method::POST, Some(json!({"description": "no name"}))).await;
        assert!(response.status().is_client_error());

        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn health_reports_service_name() {
        let app = app(CreateResponseMode::Empty);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "product-catalog");
    }

    #[tokio::test]
    async fn bootstrap_with_file_store_persists_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            store_uri: format!("file://{}", dir.path().join("catalog").display()),
            ..AppConfig::default()
        };

        let first = Application::bootstrap(config.clone()).await.unwrap();
        let response = send(&first.router(), Method::POST, Some(sample(1))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        first.shutdown().await.unwrap();

        let second = Application::bootstrap(config).await.unwrap();
        let products = list(&second.router()).await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "sample-product-1");
        second.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn bootstrap_rejects_unknown_store() {
        let config = AppConfig {
            store_uri: "redis://localhost".to_string(),
            ..AppConfig::default()
        };
        assert!(Application::bootstrap(config).await.is_err());
    }
}
