//! Monotonic time arithmetic.
//!
//! All scheduling in this crate happens on `CLOCK_MONOTONIC`: comparisons,
//! deadline arithmetic, and sleeps use the same source, never wall-clock
//! time.

use std::ops::Add;
use std::time::Duration;

pub(crate) const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point on the monotonic clock.
///
/// The clock never goes backwards and is unaffected by NTP steps or DST.
/// Invariant: `nanos` is always normalized to `[0, 1e9)`, so derived
/// lexicographic ordering over `(secs, nanos)` is the temporal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonoTime {
    secs: i64,
    nanos: u32,
}

impl MonoTime {
    /// Construct from seconds and nanoseconds, carrying excess nanoseconds
    /// into the seconds field.
    pub fn new(secs: i64, nanos: u64) -> Self {
        let carry = (nanos / NANOS_PER_SEC) as i64;
        Self {
            secs: secs.saturating_add(carry),
            nanos: (nanos % NANOS_PER_SEC) as u32,
        }
    }

    /// The current reading of the monotonic clock.
    pub fn now() -> Self {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // CLOCK_MONOTONIC is always available on the targets we support;
        // clock_gettime only fails for invalid clock ids or a bad pointer.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        debug_assert_eq!(rc, 0);
        Self {
            secs: ts.tv_sec,
            nanos: ts.tv_nsec as u32,
        }
    }

    /// This time shifted `ns` nanoseconds into the future.
    pub fn add_nanos(self, ns: u64) -> Self {
        Self::new(self.secs, self.nanos as u64 + ns)
    }

    /// Nanoseconds elapsed from `earlier` to `self`, saturating to zero if
    /// `self` is not later.
    pub fn nanos_since(self, earlier: MonoTime) -> u64 {
        if self <= earlier {
            return 0;
        }
        let secs = (self.secs - earlier.secs) as u64;
        let total = secs * NANOS_PER_SEC + self.nanos as u64;
        total - earlier.nanos as u64
    }

    /// `nanos_since` as a [`Duration`].
    pub fn duration_since(self, earlier: MonoTime) -> Duration {
        Duration::from_nanos(self.nanos_since(earlier))
    }

    /// Whole seconds component.
    pub fn secs(self) -> i64 {
        self.secs
    }

    /// Sub-second nanoseconds component, in `[0, 1e9)`.
    pub fn subsec_nanos(self) -> u32 {
        self.nanos
    }

    pub(crate) fn as_timespec(self) -> libc::timespec {
        libc::timespec {
            tv_sec: self.secs as libc::time_t,
            tv_nsec: self.nanos as libc::c_long,
        }
    }
}

impl Add<Duration> for MonoTime {
    type Output = MonoTime;

    fn add(self, rhs: Duration) -> MonoTime {
        self.add_nanos(rhs.as_nanos() as u64)
    }
}
