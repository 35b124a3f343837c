//! Error types for the scheduler crate.

use thiserror::Error;

/// Errors surfaced by scheduler configuration and thread setup.
///
/// The dispatch hot path (`queue`, `next_event`) is infallible by contract;
/// errors only arise at configuration and initialization time.
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A real-time setup syscall was refused by the OS.
    #[error("real-time setup: {op} failed (errno {errno})")]
    RtSetup {
        /// The operation that failed (e.g. `pthread_setschedparam`).
        op: &'static str,
        /// The errno reported by the kernel.
        errno: i32,
    },
}

impl SchedulerError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Create a real-time setup error from an errno.
    #[must_use]
    pub fn rt_setup(op: &'static str, errno: i32) -> Self {
        Self::RtSetup { op, errno }
    }
}

/// A specialized `Result` type for scheduler operations.
pub type SchedulerResult<T = ()> = std::result::Result<T, SchedulerError>;
