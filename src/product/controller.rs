use super::model::{ProductRequest, ProductResponse};
use super::service::ProductService;
use crate::config::CreateResponseMode;
use crate::error::Result;
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

/// HTTP routes for the catalog
///
/// | Method | Path | Success |
/// |---|---|---|
/// | GET | `/api/product` | 200, JSON array |
/// | POST | `/api/product` | 201 |
/// | DELETE | `/api/product` | 200, empty body |
pub struct ProductController {
    service: Arc<ProductService>,
    create_mode: CreateResponseMode,
}

impl ProductController {
    pub const BASE_PATH: &'static str = "/api/product";

    pub fn new(service: Arc<ProductService>, create_mode: CreateResponseMode) -> Self {
        Self {
            service,
            create_mode,
        }
    }

    pub fn router(controller: Arc<Self>) -> Router {
        Router::new()
            .route(
                Self::BASE_PATH,
                get(list_products).post(create_product).delete(delete_products),
            )
            .with_state(controller)
    }

    pub async fn list(&self) -> Result<Json<Vec<ProductResponse>>> {
        Ok(Json(self.service.list_all().await?))
    }

    pub async fn create(&self, request: ProductRequest) -> Result<Response> {
        let created = self.service.create(request).await?;

        Ok(match self.create_mode {
            CreateResponseMode::Empty => StatusCode::CREATED.into_response(),
            CreateResponseMode::Created => {
                let location = format!("{}/{}", Self::BASE_PATH, created.id);
                (
                    StatusCode::CREATED,
                    [(header::LOCATION, location)],
                    Json(created),
                )
                    .into_response()
            }
        })
    }

    pub async fn delete_all(&self) -> Result<StatusCode> {
        let removed = self.service.delete_all().await?;
        tracing::debug!("Deleted {} products", removed);
        Ok(StatusCode::OK)
    }
}

async fn list_products(
    State(controller): State<Arc<ProductController>>,
) -> Result<Json<Vec<ProductResponse>>> {
    controller.list().await
}

async fn create_product(
    State(controller): State<Arc<ProductController>>,
    Json(request): Json<ProductRequest>,
) -> Result<Response> {
    controller.create(request).await
}

async fn delete_products(State(controller): State<Arc<ProductController>>) -> Result<StatusCode> {
    controller.delete_all().await
}
