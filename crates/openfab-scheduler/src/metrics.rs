//! Dispatch lateness tracking.
//!
//! Every event returned by the scheduler is stamped with how far behind its
//! deadline the consumer actually woke up. Absolute-deadline sleeps never
//! wake early, so lateness is one-sided; a dispatch later than the
//! configured threshold counts as tardy.

/// Lateness statistics over dispatched events.
///
/// Keeps O(1) counters plus a bounded ring buffer of recent samples for
/// percentile queries. Recording is O(1) and allocation-free once the ring
/// is full.
#[derive(Debug, Clone)]
pub struct DispatchMetrics {
    /// Total events dispatched.
    pub total_dispatched: u64,

    /// Events dispatched later than the tardy threshold.
    pub tardy_dispatches: u64,

    /// Worst observed lateness in nanoseconds.
    pub max_lateness_ns: u64,

    /// Lateness of the most recent dispatch.
    pub last_lateness_ns: u64,

    /// Recent lateness samples (ring buffer).
    samples: Vec<u64>,

    /// Ring capacity.
    max_samples: usize,

    /// Ring write index.
    next_sample: usize,

    /// Reused scratch storage for percentile selection.
    scratch: Vec<u64>,
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::with_capacity(4096)
    }
}

impl DispatchMetrics {
    /// Metrics retaining up to `max_samples` recent lateness samples.
    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            total_dispatched: 0,
            tardy_dispatches: 0,
            max_lateness_ns: 0,
            last_lateness_ns: 0,
            samples: Vec::with_capacity(max_samples),
            max_samples,
            next_sample: 0,
            scratch: Vec::with_capacity(max_samples),
        }
    }

    /// Record one dispatched event.
    pub fn record_dispatch(&mut self, lateness_ns: u64, tardy: bool) {
        self.total_dispatched += 1;
        if tardy {
            self.tardy_dispatches += 1;
        }
        self.max_lateness_ns = self.max_lateness_ns.max(lateness_ns);
        self.last_lateness_ns = lateness_ns;

        if self.max_samples == 0 {
            return;
        }
        if self.samples.len() < self.max_samples {
            self.samples.push(lateness_ns);
        } else {
            self.samples[self.next_sample] = lateness_ns;
            self.next_sample = (self.next_sample + 1) % self.max_samples;
        }
    }

    /// Lateness at `percentile` (0.0 to 1.0) over the retained samples, or
    /// zero if nothing has been recorded.
    pub fn percentile_lateness_ns(&mut self, percentile: f64) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let percentile = percentile.clamp(0.0, 1.0);

        self.scratch.clear();
        self.scratch.extend_from_slice(&self.samples);

        let len = self.scratch.len();
        let index = ((len as f64 * percentile) as usize).min(len - 1);
        let (_, value, _) = self.scratch.select_nth_unstable(index);
        *value
    }

    /// p99 lateness in nanoseconds.
    pub fn p99_lateness_ns(&mut self) -> u64 {
        self.percentile_lateness_ns(0.99)
    }

    /// Fraction of dispatches that were tardy, 0.0 to 1.0.
    pub fn tardy_rate(&self) -> f64 {
        if self.total_dispatched == 0 {
            0.0
        } else {
            self.tardy_dispatches as f64 / self.total_dispatched as f64
        }
    }

    /// Number of samples currently retained.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Clear all counters and samples.
    pub fn reset(&mut self) {
        self.total_dispatched = 0;
        self.tardy_dispatches = 0;
        self.max_lateness_ns = 0;
        self.last_lateness_ns = 0;
        self.samples.clear();
        self.next_sample = 0;
        self.scratch.clear();
    }
}
