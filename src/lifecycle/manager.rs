//! Lifecycle Manager
//!
//! Runs registered init and destroy hooks in the right order.

use super::{LifecycleError, OnModuleDestroy, OnModuleInit, Result};
use std::sync::Arc;
use std::time::Duration;

struct Hook<T: ?Sized> {
    resource: Arc<T>,
    name: String,
}

/// Ordered registry of lifecycle hooks
///
/// Init hooks run in registration order and stop at the first failure;
/// destroy hooks run in reverse order and all of them run even if one fails.
#[derive(Default)]
pub struct LifecycleManager {
    init_hooks: Vec<Hook<dyn OnModuleInit>>,
    destroy_hooks: Vec<Hook<dyn OnModuleDestroy>>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_init(&mut self, resource: Arc<dyn OnModuleInit>, name: impl Into<String>) {
        self.init_hooks.push(Hook {
            resource,
            name: name.into(),
        });
    }

    pub fn register_destroy(
        &mut self,
        resource: Arc<dyn OnModuleDestroy>,
        name: impl Into<String>,
    ) {
        self.destroy_hooks.push(Hook {
            resource,
            name: name.into(),
        });
    }

    /// Run every init hook, failing fast
    pub async fn call_module_init(&self) -> Result<()> {
        for hook in &self.init_hooks {
            tracing::debug!("Initializing: {}", hook.name);
            hook.resource.on_module_init().await.map_err(|e| {
                tracing::error!("OnModuleInit failed for {}: {}", hook.name, e);
                LifecycleError::hook_failed(&hook.name, e.to_string())
            })?;
        }

        tracing::debug!("OnModuleInit complete ({} hooks)", self.init_hooks.len());
        Ok(())
    }

    /// Run every init hook, giving up after `timeout`
    pub async fn call_module_init_with_timeout(&self, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.call_module_init())
            .await
            .map_err(|_| LifecycleError::timeout("OnModuleInit", timeout))?
    }

    /// Run every destroy hook in reverse order
    ///
    /// Failures are logged and the remaining hooks still run; the first
    /// failure is returned.
    pub async fn call_module_destroy(&self) -> Result<()> {
        let mut first_failure = None;

        for hook in self.destroy_hooks.iter().rev() {
            tracing::debug!("Destroying: {}", hook.name);
            if let Err(e) = hook.resource.on_module_destroy().await {
                tracing::error!("OnModuleDestroy failed for {}: {}", hook.name, e);
                if first_failure.is_none() {
                    first_failure = Some(LifecycleError::hook_failed(&hook.name, e.to_string()));
                }
            }
        }

        tracing::debug!(
            "OnModuleDestroy complete ({} hooks)",
            self.destroy_hooks.len()
        );
        first_failure.map_or(Ok(()), Err)
    }

    pub fn init_hook_count(&self) -> usize {
        self.init_hooks.len()
    }

    pub fn destroy_hook_count(&self) -> usize {
        self.destroy_hooks.len()
    }
}
