use super::model::Product;

/// Notified after a product has been stored
///
/// Called only on success, after the store has assigned the id.
pub trait ProductObserver: Send + Sync {
    fn on_created(&self, product: &Product);
}

/// Emits the `Product saved: ...` info line
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl ProductObserver for LoggingObserver {
    fn on_created(&self, product: &Product) {
        tracing::info!("Product saved: {}", product);
    }
}
