//! # Product Catalog
//!
//! A small HTTP service that creates, lists and bulk-deletes product records
//! kept in a document store.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/api/product` | 200, JSON array of `{id, name, description, price}` |
//! | POST | `/api/product` | 201 (body depends on `CREATE_RESPONSE`) |
//! | DELETE | `/api/product` | 200, empty body |
//! | GET | `/health` | 200 |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use product_catalog::{AppConfig, Application, ConfigService};
//!
//! #[tokio::main]
//! async fn main() -> product_catalog::Result<()> {
//!     let config = AppConfig::from_config(&ConfigService::from_env())?;
//!     Application::bootstrap(config).await?.serve().await
//! }
//! ```
//!
//! For tests, [`build_router`] composes the routes over any
//! [`DocumentStore`](store::DocumentStore) without binding a socket.

pub mod application;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod lifecycle;
pub mod product;
pub mod store;

pub use application::{Application, build_router};
pub use config::{AppConfig, ConfigService, CreateResponseMode};
pub use error::{CatalogError, Result};
