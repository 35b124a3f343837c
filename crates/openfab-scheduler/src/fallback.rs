//! Fallback platform implementation for non-Linux systems.
//!
//! Development builds on other Unixes get plain `thread::sleep` timing and
//! no scheduling-class elevation. Dispatch accuracy is whatever the host
//! scheduler provides.

use crate::clock::MonoTime;
use crate::error::SchedulerResult;
use crate::rt::RtOptions;

/// Real-time elevation is unsupported here; report success so callers
/// proceed at normal priority.
pub(crate) fn promote_current_thread(_options: &RtOptions) -> SchedulerResult<()> {
    Ok(())
}

/// Approximate absolute sleep built from relative sleeps.
pub(crate) fn sleep_until(deadline: MonoTime) {
    loop {
        let now = MonoTime::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep(deadline.duration_since(now));
    }
}
