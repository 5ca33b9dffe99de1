//! Startup and shutdown hooks
//!
//! Resources that must be prepared before the listener binds (creating a
//! store directory) or released after it stops (flushing append handles)
//! implement [`OnModuleInit`] / [`OnModuleDestroy`] and are registered with a
//! [`LifecycleManager`].
//!
//! ```text
//! 1. Configuration loading
//!    ↓
//! 2. Store opened from STORE_URI
//!    ↓
//! 3. OnModuleInit (registration order, bounded by INIT_TIMEOUT_SECS)
//!    ↓
//! 4. Router composed, listener bound
//!    ↓
//! [Serving...]
//!    ↓
//! 5. Shutdown signal (SIGTERM/SIGINT), in-flight requests drained
//!    ↓
//! 6. OnModuleDestroy (reverse registration order)
//! ```

mod error;
mod manager;
mod shutdown;
mod traits;

pub use error::{LifecycleError, Result};
pub use manager::LifecycleManager;
pub use shutdown::shutdown_signal;
pub use traits::{OnModuleDestroy, OnModuleInit};
