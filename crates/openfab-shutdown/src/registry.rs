//! Leveled exit-handler registry.

use crate::error::{ShutdownError, ShutdownResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Number of exit-handler levels. Level 0 runs first.
pub const NUM_LEVELS: usize = 3;

type Handler = Box<dyn Fn() + Send + Sync + 'static>;

/// An ordered registry of exit handlers.
///
/// Handlers are grouped into [`NUM_LEVELS`] levels; on shutdown, levels run
/// in ascending order and handlers within a level run in registration
/// order. The whole sequence runs at most once per registry lifetime,
/// guarded by an atomic flag, so concurrent shutdown paths (normal exit
/// racing a signal) stay safe.
///
/// Deregistration is not supported: handlers live until the process ends.
///
/// The process-global instance is reached through the free functions
/// [`register_exit_handler`], [`invoke_all`], and [`is_exiting`]; the type
/// itself is constructible so the sequencing rules can be tested in
/// isolation.
pub struct ShutdownRegistry {
    levels: Mutex<[Vec<Handler>; NUM_LEVELS]>,
    exiting: AtomicBool,
}

impl ShutdownRegistry {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            levels: Mutex::new([Vec::new(), Vec::new(), Vec::new()]),
            exiting: AtomicBool::new(false),
        }
    }

    /// Append `handler` at `level`.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::LevelOutOfRange`] if `level >= NUM_LEVELS`.
    pub fn register(
        &self,
        level: usize,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> ShutdownResult<()> {
        if level >= NUM_LEVELS {
            return Err(ShutdownError::LevelOutOfRange {
                level,
                max: NUM_LEVELS,
            });
        }
        self.levels.lock()[level].push(Box::new(handler));
        Ok(())
    }

    /// Run every handler: levels ascending, registration order within a
    /// level.
    ///
    /// Runs at most once; concurrent and repeated calls return immediately.
    /// Handlers are taken out of the registry before running so the lock is
    /// not held across callbacks; registrations made from inside a handler
    /// are silently dropped.
    pub fn run(&self) {
        if self.exiting.swap(true, Ordering::SeqCst) {
            return;
        }
        let levels = std::mem::take(&mut *self.levels.lock());
        for level in levels.iter() {
            for handler in level {
                handler();
            }
        }
    }

    /// Whether shutdown has begun.
    pub fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::SeqCst)
    }
}

impl Default for ShutdownRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: ShutdownRegistry = ShutdownRegistry::new();

/// Append `handler` to the process-global registry at `level`.
///
/// # Errors
///
/// Returns [`ShutdownError::LevelOutOfRange`] if `level` does not exist.
pub fn register_exit_handler(
    handler: impl Fn() + Send + Sync + 'static,
    level: usize,
) -> ShutdownResult<()> {
    GLOBAL.register(level, handler)
}

/// Run the process-global exit handlers (at most once per process).
pub fn invoke_all() {
    GLOBAL.run();
}

/// Whether process shutdown has begun.
pub fn is_exiting() -> bool {
    GLOBAL.is_exiting()
}
