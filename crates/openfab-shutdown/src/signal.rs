//! Signal wiring for the process-global shutdown path.
//!
//! Interactive signals are funneled: the async-signal-safe handler writes
//! one byte to a self-pipe and a dedicated thread does the real work in
//! ordinary thread context. `SIGABRT` and `SIGSEGV` terminate the process
//! and cannot be deferred, so their handlers run the registry directly and
//! restrict themselves to `libc::write` for diagnostics.

use crate::error::{ShutdownError, ShutdownResult};
use crate::registry;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Once;
use tracing::info;

/// Write end of the self-pipe; -1 until handlers are installed.
static SIGNAL_PIPE_WR: AtomicI32 = AtomicI32::new(-1);

static INSTALL: Once = Once::new();

/// Install the shutdown signal handlers and the atexit hook.
///
/// Idempotent: only the first call installs anything; later calls return
/// `Ok` immediately. Handles:
///
/// - normal process exit (`atexit`),
/// - `SIGINT` (Ctrl-C) and `SIGTERM`, funneled,
/// - `SIGTSTP` (Ctrl-Z), funneled; treated as shutdown rather than
///   suspend, because suspended firmware would leave outputs energized,
/// - `SIGABRT`, direct,
/// - `SIGSEGV`, direct, logging the faulting address.
///
/// Every fatal-signal path runs the exit handlers and terminates the
/// process with exit code 1.
///
/// # Errors
///
/// Returns an error if the self-pipe, the funnel thread, or any `sigaction`
/// call fails.
pub fn install_signal_handlers() -> ShutdownResult<()> {
    let mut result = Ok(());
    INSTALL.call_once(|| result = install());
    result
}

fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

fn install() -> ShutdownResult<()> {
    // Normal exits run the registry too; the atomic guard keeps the
    // sequence once-only when an exit races a signal.
    let _ = unsafe { libc::atexit(atexit_hook) };

    let mut fds = [-1i32; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(ShutdownError::Pipe { errno: errno() });
    }
    let (pipe_rd, pipe_wr) = (fds[0], fds[1]);
    unsafe {
        let _ = libc::fcntl(pipe_rd, libc::F_SETFD, libc::FD_CLOEXEC);
        let _ = libc::fcntl(pipe_wr, libc::F_SETFD, libc::FD_CLOEXEC);
    }
    SIGNAL_PIPE_WR.store(pipe_wr, Ordering::SeqCst);

    std::thread::Builder::new()
        .name("shutdown-signal".into())
        .spawn(move || funnel_loop(pipe_rd))
        .map_err(|e| ShutdownError::FunnelThread(e.to_string()))?;

    let funnel = funnel_handler as extern "C" fn(libc::c_int);
    for signal in [libc::SIGINT, libc::SIGTSTP, libc::SIGTERM] {
        install_handler(signal, funnel as usize, 0)?;
    }
    let abort = abort_handler as extern "C" fn(libc::c_int);
    install_handler(libc::SIGABRT, abort as usize, 0)?;
    let segv =
        segfault_handler as extern "C" fn(libc::c_int, *mut libc::siginfo_t, *mut libc::c_void);
    install_handler(libc::SIGSEGV, segv as usize, libc::SA_SIGINFO)?;

    Ok(())
}

fn install_handler(signal: libc::c_int, action: usize, flags: libc::c_int) -> ShutdownResult<()> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = action;
        sa.sa_flags = flags;
        libc::sigemptyset(&mut sa.sa_mask);
        if libc::sigaction(signal, &sa, std::ptr::null_mut()) != 0 {
            return Err(ShutdownError::SignalInstall {
                signal,
                errno: errno(),
            });
        }
    }
    Ok(())
}

/// Blocks on the self-pipe; one byte means a fatal signal arrived.
fn funnel_loop(pipe_rd: libc::c_int) {
    loop {
        let mut buf = [0u8; 1];
        let n = unsafe { libc::read(pipe_rd, buf.as_mut_ptr().cast(), 1) };
        if n == 1 {
            info!(signal = buf[0], "caught signal, running exit handlers");
            registry::invoke_all();
            std::process::exit(1);
        }
        if n == 0 {
            // Write end closed; nothing left to wait for.
            return;
        }
        if n < 0 && errno() != libc::EINTR {
            return;
        }
    }
}

extern "C" fn atexit_hook() {
    registry::invoke_all();
}

/// Handler for SIGINT/SIGTSTP/SIGTERM: defer everything to the funnel
/// thread. Only async-signal-safe calls are allowed here.
extern "C" fn funnel_handler(signal: libc::c_int) {
    let fd = SIGNAL_PIPE_WR.load(Ordering::SeqCst);
    if fd >= 0 {
        let byte = signal as u8;
        let _ = unsafe { libc::write(fd, (&byte as *const u8).cast(), 1) };
    }
}

/// SIGABRT cannot return to the abort site; run the registry here despite
/// the signal context and terminate.
extern "C" fn abort_handler(_signal: libc::c_int) {
    write_stderr(b"caught abort signal, running exit handlers\n");
    registry::invoke_all();
    unsafe { libc::_exit(1) };
}

/// Three-argument SIGSEGV handler: report the faulting address, run the
/// registry, terminate.
extern "C" fn segfault_handler(
    _signal: libc::c_int,
    info: *mut libc::siginfo_t,
    _context: *mut libc::c_void,
) {
    write_stderr(b"caught segfault at address ");
    write_stderr_hex(fault_addr(info));
    write_stderr(b"\n");
    registry::invoke_all();
    unsafe { libc::_exit(1) };
}

#[cfg(target_os = "linux")]
fn fault_addr(info: *mut libc::siginfo_t) -> u64 {
    if info.is_null() {
        0
    } else {
        unsafe { (*info).si_addr() as usize as u64 }
    }
}

#[cfg(not(target_os = "linux"))]
fn fault_addr(info: *mut libc::siginfo_t) -> u64 {
    if info.is_null() {
        0
    } else {
        unsafe { (*info).si_addr as usize as u64 }
    }
}

fn write_stderr(bytes: &[u8]) {
    let _ = unsafe { libc::write(libc::STDERR_FILENO, bytes.as_ptr().cast(), bytes.len()) };
}

/// Hex formatting without allocation, usable from signal context.
fn write_stderr_hex(value: u64) {
    const DIGITS: [u8; 16] = *b"0123456789abcdef";
    let mut buf = [0u8; 18];
    buf[0] = b'0';
    buf[1] = b'x';
    for i in 0..16 {
        let shift = (15 - i) * 4;
        buf[2 + i] = DIGITS[((value >> shift) & 0xf) as usize];
    }
    write_stderr(&buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        assert!(install_signal_handlers().is_ok());
        assert!(install_signal_handlers().is_ok());
    }
}
