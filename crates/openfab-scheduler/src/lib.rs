//! Deadline-driven actuation event scheduling for fabrication firmware.
//!
//! This crate dispatches timestamped hardware actuations (stepper pulses,
//! PWM edges for heaters and fans) at absolute deadlines on the monotonic
//! clock, while producer threads enqueue new work concurrently. It provides:
//!
//! - **`MonoTime`**: monotonic time arithmetic with nanosecond resolution
//! - **`Event`**: a scheduled edge on a single output channel
//! - **`PwmTable`**: per-channel duty parameters for self-sustaining waves
//! - **`EventQueue`**: a bounded, deadline-ordered priority queue
//! - **`Scheduler`**: the producer/consumer core with backpressure and
//!   paired-edge regeneration
//! - **`DispatchMetrics`**: lateness tracking for dispatched events
//!
//! The host OS is a stock Linux kernel, not an RTOS: timing is best-effort
//! with elevated `SCHED_FIFO` priority. The consumer runs on a dedicated
//! native thread so `clock_nanosleep` against absolute deadlines stays
//! precise; coroutines are deliberately not used.
//!
//! # Example
//!
//! ```no_run
//! use openfab_scheduler::{Edge, Event, Scheduler, SchedulerConfig};
//! use std::sync::Arc;
//!
//! let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default()).expect("config"));
//!
//! // Heater on channel 3: 1ms high, 2ms low.
//! scheduler.schedule_pwm(3, 1_000_000, 2_000_000);
//!
//! // One-shot stepper pulse 50us after the current tail.
//! let at = scheduler.last_scheduled_time().add_nanos(50_000);
//! scheduler.queue(Event::new(at, 0, Edge::Rise));
//!
//! let consumer = Arc::clone(&scheduler);
//! std::thread::spawn(move || {
//!     consumer.init_consumer_thread();
//!     loop {
//!         let _evt = consumer.next_event();
//!         // hand the event to the actuation driver
//!     }
//! });
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod pwm;
pub mod queue;
pub mod rt;
pub mod scheduler;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
mod fallback;

pub mod prelude;

pub use clock::MonoTime;
pub use config::SchedulerConfig;
pub use error::{SchedulerError, SchedulerResult};
pub use event::{ChannelId, Edge, Event};
pub use metrics::DispatchMetrics;
pub use pwm::{PwmDuty, PwmTable, MAX_CHANNELS};
pub use queue::EventQueue;
pub use rt::RtOptions;
pub use scheduler::Scheduler;

/// Default soft capacity of the event queue before producers are throttled.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Default `SCHED_FIFO` priority for the consumer thread.
///
/// High enough to preempt ordinary workloads, low enough to leave kernel
/// threads (priority 99 watchdogs, IRQ threads) alone.
pub const DEFAULT_RT_PRIORITY: i32 = 30;

/// Default lateness above which a dispatch is counted as tardy (0.25ms).
pub const DEFAULT_TARDY_THRESHOLD_NS: u64 = 250_000;
