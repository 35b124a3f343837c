//! Prelude module for common shutdown types.

pub use crate::error::{ShutdownError, ShutdownResult};
pub use crate::registry::{
    invoke_all, is_exiting, register_exit_handler, ShutdownRegistry, NUM_LEVELS,
};
pub use crate::signal::install_signal_handlers;
