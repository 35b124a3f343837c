//! Real-time setup for the consumer thread.

use crate::config::SchedulerConfig;
use crate::error::SchedulerResult;

#[cfg(target_os = "linux")]
use crate::linux as platform;

#[cfg(not(target_os = "linux"))]
use crate::fallback as platform;

/// Real-time parameters applied to the consumer thread.
///
/// All of these are best-effort: an unprivileged development build will be
/// refused `SCHED_FIFO` by the kernel, and the scheduler keeps working at
/// normal priority.
#[derive(Debug, Clone)]
pub struct RtOptions {
    /// `SCHED_FIFO` priority to request (1..=99).
    pub priority: i32,

    /// Lock all current and future memory pages (`mlockall`) so dispatch
    /// never takes a page fault.
    pub lock_memory: bool,

    /// Restrict the thread to the CPU cores set in this mask.
    pub cpu_affinity: Option<u64>,
}

impl Default for RtOptions {
    fn default() -> Self {
        Self {
            priority: crate::DEFAULT_RT_PRIORITY,
            lock_memory: false,
            cpu_affinity: None,
        }
    }
}

impl From<&SchedulerConfig> for RtOptions {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            priority: config.rt_priority,
            lock_memory: config.lock_memory,
            cpu_affinity: config.cpu_affinity,
        }
    }
}

/// Move the calling thread into the real-time FIFO scheduling class and
/// apply the remaining options.
///
/// # Errors
///
/// Returns the first refused syscall. Callers that can live without
/// elevation (the usual case during development) should log the error and
/// continue.
pub fn promote_current_thread(options: &RtOptions) -> SchedulerResult<()> {
    platform::promote_current_thread(options)
}
