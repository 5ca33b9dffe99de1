//! Product catalog
//!
//! Three layers, composed top-down per request:
//!
//! - [`ProductController`]: HTTP routes under `/api/product`
//! - [`ProductService`]: request ↔ entity ↔ response mapping
//! - [`ProductRepository`]: the `product` collection of the document store

pub mod controller;
pub mod model;
pub mod observer;
pub mod repository;
pub mod service;

pub use controller::ProductController;
pub use model::{Product, ProductRequest, ProductResponse};
pub use observer::{LoggingObserver, ProductObserver};
pub use repository::{DocumentProductRepository, PRODUCT_COLLECTION, ProductRepository};
pub use service::ProductService;
