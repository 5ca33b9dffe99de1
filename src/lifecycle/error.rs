//! Lifecycle-specific error types

use thiserror::Error;

/// Errors raised while starting or stopping managed resources
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A resource could not be prepared
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// A resource could not be released cleanly
    #[error("Shutdown failed: {0}")]
    ShutdownFailed(String),

    /// A phase did not finish in time
    #[error("Timeout during {phase} after {elapsed_ms}ms")]
    Timeout { phase: String, elapsed_ms: u128 },

    /// A named hook failed
    #[error("Hook {hook} failed: {message}")]
    HookFailed { hook: String, message: String },
}

impl LifecycleError {
    pub fn init_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    pub fn shutdown_failed(msg: impl Into<String>) -> Self {
        Self::ShutdownFailed(msg.into())
    }

    pub fn timeout(phase: impl Into<String>, elapsed: std::time::Duration) -> Self {
        Self::Timeout {
            phase: phase.into(),
            elapsed_ms: elapsed.as_millis(),
        }
    }

    pub fn hook_failed(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HookFailed {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
