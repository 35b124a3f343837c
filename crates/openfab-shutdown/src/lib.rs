//! Ordered, once-only process shutdown for firmware that drives physical
//! outputs.
//!
//! A crashed control process must still de-energize its outputs: a heated
//! nozzle left on is a fire risk, not an inconvenience. This crate keeps a
//! process-global registry of exit handlers grouped into a small number of
//! ordered levels and guarantees the whole sequence runs **at most once**,
//! whether the process ends normally, is interrupted at the terminal, or
//! dies on a fatal signal.
//!
//! Interactive signals (`SIGINT`, `SIGTSTP`, `SIGTERM`) are funneled
//! through a self-pipe to a dedicated thread, so the handlers themselves
//! run in ordinary thread context. `SIGABRT` and `SIGSEGV` cannot be
//! deferred; their handlers log through `libc::write` and run the registry
//! directly before terminating, so exit handlers registered by the embedding
//! firmware should stick to async-signal-safe work.
//!
//! # Example
//!
//! ```no_run
//! openfab_shutdown::install_signal_handlers().expect("signal setup");
//!
//! // Level 0 runs first: cut power to the heaters.
//! openfab_shutdown::register_exit_handler(|| { /* disable heater GPIO */ }, 0)
//!     .expect("level in range");
//! // Level 1 afterwards: release the motor drivers.
//! openfab_shutdown::register_exit_handler(|| { /* unmount steppers */ }, 1)
//!     .expect("level in range");
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod error;
pub mod prelude;
pub mod registry;
pub mod signal;

pub use error::{ShutdownError, ShutdownResult};
pub use registry::{
    invoke_all, is_exiting, register_exit_handler, ShutdownRegistry, NUM_LEVELS,
};
pub use signal::install_signal_handlers;
