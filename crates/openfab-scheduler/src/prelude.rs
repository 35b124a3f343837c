//! Prelude module for common scheduler types.

pub use crate::clock::MonoTime;
pub use crate::config::SchedulerConfig;
pub use crate::error::{SchedulerError, SchedulerResult};
pub use crate::event::{ChannelId, Edge, Event};
pub use crate::metrics::DispatchMetrics;
pub use crate::pwm::{PwmDuty, PwmTable, MAX_CHANNELS};
pub use crate::queue::EventQueue;
pub use crate::rt::RtOptions;
pub use crate::scheduler::Scheduler;
pub use crate::{DEFAULT_BUFFER_SIZE, DEFAULT_RT_PRIORITY, DEFAULT_TARDY_THRESHOLD_NS};
