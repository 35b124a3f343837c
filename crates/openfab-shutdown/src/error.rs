//! Error types for the shutdown crate.

use thiserror::Error;

/// Errors from exit-handler registration and signal installation.
#[derive(Debug, Clone, Error)]
pub enum ShutdownError {
    /// Attempted to register a handler at a level that does not exist.
    #[error("exit handler level {level} out of range (valid levels 0..{max})")]
    LevelOutOfRange {
        /// The requested level.
        level: usize,
        /// Number of levels available.
        max: usize,
    },

    /// The self-pipe for the signal funnel could not be created.
    #[error("failed to create signal pipe (errno {errno})")]
    Pipe {
        /// The errno reported by the kernel.
        errno: i32,
    },

    /// `sigaction` refused a handler installation.
    #[error("failed to install handler for signal {signal} (errno {errno})")]
    SignalInstall {
        /// Signal number.
        signal: i32,
        /// The errno reported by the kernel.
        errno: i32,
    },

    /// The signal funnel thread could not be spawned.
    #[error("failed to spawn signal funnel thread: {0}")]
    FunnelThread(String),
}

/// A specialized `Result` type for shutdown operations.
pub type ShutdownResult<T> = std::result::Result<T, ShutdownError>;
