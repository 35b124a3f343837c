//! Linux-specific platform implementation.

use crate::clock::MonoTime;
use crate::error::{SchedulerError, SchedulerResult};
use crate::rt::RtOptions;
use libc::{
    clock_nanosleep, mlockall, pthread_self, pthread_setschedparam, sched_param, CLOCK_MONOTONIC,
    EINTR, MCL_CURRENT, MCL_FUTURE, SCHED_FIFO, TIMER_ABSTIME,
};

fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Move the calling thread into `SCHED_FIFO` and apply memory locking and
/// CPU affinity.
pub(crate) fn promote_current_thread(options: &RtOptions) -> SchedulerResult<()> {
    let param = sched_param {
        sched_priority: options.priority,
    };
    // pthread_setschedparam reports the error number directly.
    let rc = unsafe { pthread_setschedparam(pthread_self(), SCHED_FIFO, &param) };
    if rc != 0 {
        return Err(SchedulerError::rt_setup("pthread_setschedparam", rc));
    }

    if options.lock_memory && unsafe { mlockall(MCL_CURRENT | MCL_FUTURE) } != 0 {
        return Err(SchedulerError::rt_setup("mlockall", errno()));
    }

    if let Some(mask) = options.cpu_affinity {
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut set);
            for cpu in 0..64usize {
                if mask & (1u64 << cpu) != 0 {
                    libc::CPU_SET(cpu, &mut set);
                }
            }
            if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) != 0 {
                return Err(SchedulerError::rt_setup("sched_setaffinity", errno()));
            }
        }
    }

    Ok(())
}

/// Sleep until `deadline` on the monotonic clock.
///
/// The deadline is absolute (`TIMER_ABSTIME`), so repeated sleeps do not
/// accumulate drift and a signal-interrupted sleep can simply be retried
/// for the same instant. A deadline already in the past returns
/// immediately.
pub(crate) fn sleep_until(deadline: MonoTime) {
    let ts = deadline.as_timespec();
    loop {
        let rc =
            unsafe { clock_nanosleep(CLOCK_MONOTONIC, TIMER_ABSTIME, &ts, std::ptr::null_mut()) };
        if rc == 0 {
            return;
        }
        if rc == EINTR {
            // A signal landed mid-sleep. If it began a shutdown there is no
            // point finishing the wait; otherwise retry the same absolute
            // deadline.
            if openfab_shutdown::is_exiting() {
                return;
            }
            continue;
        }
        // Remaining codes (EINVAL, EFAULT) would mean a malformed timespec;
        // deadlines are normalized by construction.
        debug_assert_eq!(rc, 0, "clock_nanosleep returned {rc}");
        return;
    }
}
