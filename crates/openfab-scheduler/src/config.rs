//! Scheduler configuration.

use crate::error::{SchedulerError, SchedulerResult};
use crate::{DEFAULT_BUFFER_SIZE, DEFAULT_RT_PRIORITY, DEFAULT_TARDY_THRESHOLD_NS};
use serde::{Deserialize, Serialize};

/// Configuration of the scheduler core and its consumer thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Soft capacity of the event queue; producers are throttled beyond it.
    pub buffer_size: usize,

    /// `SCHED_FIFO` priority requested for the consumer thread (1..=99).
    pub rt_priority: i32,

    /// Lock current and future memory pages to avoid page faults during
    /// dispatch.
    pub lock_memory: bool,

    /// CPU affinity mask for the consumer thread (bit 0 = core 0).
    pub cpu_affinity: Option<u64>,

    /// Lateness above which a dispatch is counted as tardy, in nanoseconds.
    pub tardy_threshold_ns: u64,

    /// Number of lateness samples retained for percentile queries.
    pub metrics_samples: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            rt_priority: DEFAULT_RT_PRIORITY,
            lock_memory: false,
            cpu_affinity: None,
            tardy_threshold_ns: DEFAULT_TARDY_THRESHOLD_NS,
            metrics_samples: 4096,
        }
    }
}

impl SchedulerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if any value is out of
    /// range.
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.buffer_size == 0 {
            return Err(SchedulerError::invalid_config(
                "buffer_size must be greater than 0",
            ));
        }
        if !(1..=99).contains(&self.rt_priority) {
            return Err(SchedulerError::invalid_config(
                "rt_priority must be in 1..=99",
            ));
        }
        if self.tardy_threshold_ns == 0 {
            return Err(SchedulerError::invalid_config(
                "tardy_threshold_ns must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Set the queue soft capacity.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the consumer thread priority.
    #[must_use]
    pub fn with_rt_priority(mut self, rt_priority: i32) -> Self {
        self.rt_priority = rt_priority;
        self
    }

    /// Enable or disable memory locking.
    #[must_use]
    pub fn with_lock_memory(mut self, lock_memory: bool) -> Self {
        self.lock_memory = lock_memory;
        self
    }

    /// Pin the consumer thread to the cores in `mask`.
    #[must_use]
    pub fn with_cpu_affinity(mut self, mask: u64) -> Self {
        self.cpu_affinity = Some(mask);
        self
    }

    /// Set the tardy dispatch threshold.
    #[must_use]
    pub fn with_tardy_threshold_ns(mut self, tardy_threshold_ns: u64) -> Self {
        self.tardy_threshold_ns = tardy_threshold_ns;
        self
    }
}
