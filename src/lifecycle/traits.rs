//! Lifecycle hook traits
//!
//! Hooks take `&self`: managed resources are shared with request handlers
//! through `Arc`, so any state a hook changes sits behind the resource's own
//! synchronization.

use super::LifecycleError;
use async_trait::async_trait;

/// Called once before the service starts accepting requests
///
/// # Example
///
/// ```rust,ignore
/// #[async_trait]
/// impl OnModuleInit for FileStore {
///     async fn on_module_init(&self) -> Result<(), LifecycleError> {
///         tokio::fs::create_dir_all(&self.root)
///             .await
///             .map_err(|e| LifecycleError::init_failed(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait OnModuleInit: Send + Sync {
    async fn on_module_init(&self) -> Result<(), LifecycleError>;
}

/// Called once after the server has stopped accepting requests
///
/// Resources are destroyed in **reverse order** of registration.
#[async_trait]
pub trait OnModuleDestroy: Send + Sync {
    async fn on_module_destroy(&self) -> Result<(), LifecycleError>;
}
