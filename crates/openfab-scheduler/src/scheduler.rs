//! Producer/consumer scheduling core.
//!
//! One priority-elevated consumer thread loops on [`Scheduler::next_event`];
//! any number of producer threads call [`Scheduler::queue`],
//! [`Scheduler::schedule_pwm`], and [`Scheduler::last_scheduled_time`]. A
//! single mutex guards the event queue and the PWM table; there is no
//! lock-free path. Producers must not hold external locks while enqueueing,
//! or they risk inversion against the consumer.
//!
//! Backpressure works through a gate owned by the consumer: whenever a pop
//! leaves the queue at or above its soft capacity the consumer closes the
//! gate, and producers park on a condition variable until a later pop drops
//! the queue below capacity again. The consumer drains one event per
//! iteration, so a saturated queue throttles producers to the dispatch
//! rate.

use crate::clock::MonoTime;
use crate::config::SchedulerConfig;
use crate::error::SchedulerResult;
use crate::event::{ChannelId, Edge, Event};
use crate::metrics::DispatchMetrics;
use crate::pwm::{PwmDuty, PwmTable};
use crate::queue::EventQueue;
use crate::rt::{self, RtOptions};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

#[cfg(target_os = "linux")]
use crate::linux as platform;

#[cfg(not(target_os = "linux"))]
use crate::fallback as platform;

/// Everything guarded by the scheduler mutex.
struct SchedState {
    queue: EventQueue,
    pwm: PwmTable,
    /// Set by the consumer when a pop leaves the queue saturated; producers
    /// park on `space` while this holds.
    gate_closed: bool,
    metrics: DispatchMetrics,
}

/// Deadline scheduler for hardware actuation events.
///
/// See the crate-level documentation for the threading model. All methods
/// take `&self`; share the scheduler between threads behind an `Arc`.
pub struct Scheduler {
    state: Mutex<SchedState>,
    /// Signalled on every insert; the consumer waits here while empty.
    nonempty: Condvar,
    /// Signalled when the backpressure gate reopens.
    space: Condvar,
    rt_options: RtOptions,
    tardy_threshold_ns: u64,
}

impl Scheduler {
    /// Create a scheduler from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SchedulerError::InvalidConfig`] if the configuration
    /// fails validation.
    pub fn new(config: SchedulerConfig) -> SchedulerResult<Self> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(SchedState {
                queue: EventQueue::with_capacity(config.buffer_size),
                pwm: PwmTable::new(),
                gate_closed: false,
                metrics: DispatchMetrics::with_capacity(config.metrics_samples),
            }),
            nonempty: Condvar::new(),
            space: Condvar::new(),
            rt_options: RtOptions::from(&config),
            tardy_threshold_ns: config.tardy_threshold_ns,
        })
    }

    /// A scheduler with the default configuration.
    pub fn with_defaults() -> Self {
        // The default configuration always validates.
        match Self::new(SchedulerConfig::default()) {
            Ok(scheduler) => scheduler,
            Err(_) => unreachable!("default configuration is valid"),
        }
    }

    /// Enqueue a one-shot actuation event.
    ///
    /// Blocks while the consumer has signalled backpressure and the queue is
    /// at capacity; otherwise returns promptly. Never fails.
    pub fn queue(&self, evt: Event) {
        let mut st = self.state.lock();
        while st.gate_closed && st.queue.is_saturated() {
            self.space.wait(&mut st);
        }
        st.queue.insert(evt);
        trace!(channel = evt.channel(), edge = ?evt.edge(), "queued event");
        self.nonempty.notify_one();
    }

    /// Start or update a self-sustaining square wave on `channel`.
    ///
    /// The first activation seeds a rising edge at the current time. If the
    /// channel is already active (both half-periods non-zero) the duty is
    /// updated in place and regeneration picks it up on the next edge; no
    /// duplicate seed is enqueued. Passing two zeros stops the wave after
    /// the edge already in flight.
    pub fn schedule_pwm(&self, channel: ChannelId, high_ns: u64, low_ns: u64) {
        let seed = {
            let mut st = self.state.lock();
            let prev = st.pwm.get(channel);
            st.pwm.set(channel, PwmDuty::new(high_ns, low_ns));
            !prev.is_active()
        };
        debug!(channel, high_ns, low_ns, seed, "schedule_pwm");
        if seed {
            self.queue(Event::new(MonoTime::now(), channel, Edge::Rise));
        }
    }

    /// Block until the next deadline is reached and return the event to
    /// actuate.
    ///
    /// Consumer thread only. Waits on the queue while it is empty, pops the
    /// earliest event, regenerates its paired PWM edge, decides
    /// backpressure, then sleeps to the absolute deadline on the monotonic
    /// clock so jitter never accumulates into drift.
    pub fn next_event(&self) -> Event {
        let mut st = self.state.lock();
        let evt = loop {
            if let Some(evt) = st.queue.pop_min() {
                break evt;
            }
            // Condition variables can wake spuriously; always re-check.
            self.nonempty.wait(&mut st);
        };

        // Regenerate the complementary edge before this event can be
        // observed: every Rise handed to the caller already has its Fall
        // queued, unless the channel's half-period is zero and the wave is
        // winding down.
        let duty = st.pwm.get(evt.channel());
        let half_period = match evt.edge() {
            Edge::Rise => duty.high_ns(),
            Edge::Fall => duty.low_ns(),
        };
        if half_period > 0 {
            st.queue.insert(Event::new(
                evt.deadline().add_nanos(half_period),
                evt.channel(),
                evt.edge().opposite(),
            ));
        }

        if st.queue.is_saturated() {
            st.gate_closed = true;
        } else if st.gate_closed {
            st.gate_closed = false;
            self.space.notify_all();
        }
        drop(st);

        platform::sleep_until(evt.deadline());

        let lateness = MonoTime::now().nanos_since(evt.deadline());
        self.state
            .lock()
            .metrics
            .record_dispatch(lateness, lateness > self.tardy_threshold_ns);
        trace!(channel = evt.channel(), lateness_ns = lateness, "dispatched");
        evt
    }

    /// Deadline of the latest-scheduled queued event, for producers that
    /// chain new work after the current tail. Falls back to the current
    /// time when the queue is empty.
    pub fn last_scheduled_time(&self) -> MonoTime {
        let st = self.state.lock();
        if let Some(tail) = st.queue.peek_latest() {
            return tail.deadline();
        }
        drop(st);
        MonoTime::now()
    }

    /// Elevate the calling thread to the real-time FIFO scheduling class.
    ///
    /// Call once from the consumer thread before the dispatch loop. Refusal
    /// (the usual case for unprivileged development runs) is logged and
    /// otherwise ignored; the scheduler keeps working at normal priority.
    pub fn init_consumer_thread(&self) {
        match rt::promote_current_thread(&self.rt_options) {
            Ok(()) => debug!(
                priority = self.rt_options.priority,
                "consumer thread promoted to SCHED_FIFO"
            ),
            Err(err) => warn!(%err, "running consumer at normal priority"),
        }
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Current backpressure threshold.
    pub fn buffer_size(&self) -> usize {
        self.state.lock().queue.capacity()
    }

    /// Change the backpressure threshold. A size of zero is a programmer
    /// error and panics.
    pub fn set_buffer_size(&self, size: usize) {
        let mut st = self.state.lock();
        st.queue.set_capacity(size);
        if st.gate_closed && !st.queue.is_saturated() {
            st.gate_closed = false;
            self.space.notify_all();
        }
    }

    /// Snapshot of the dispatch lateness metrics.
    pub fn metrics(&self) -> DispatchMetrics {
        self.state.lock().metrics.clone()
    }
}
