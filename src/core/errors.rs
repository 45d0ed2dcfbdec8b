/*!
 * Error Types
 * Centralized error handling with thiserror
 */

use thiserror::Error;

// Re-export subsystem errors so callers have one place to look.
pub use crate::config::ConfigError;
pub use crate::memory::MemoryError;
pub use crate::process::TraceError;

/// Top-level simulator error
#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}
