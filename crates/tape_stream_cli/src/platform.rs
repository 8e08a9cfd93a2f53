//! Process signal handling.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use signal_hook::iterator::Signals;

/// Stops the signal thread when dropped.
pub struct SignalHookGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run_cleanup_once<F>(cleanup: &Arc<F>, ran: &AtomicBool, signal: i32)
where
    F: Fn(i32) + Send + Sync + 'static + ?Sized,
{
    if !ran.swap(true, Ordering::SeqCst) {
        cleanup(signal);
    }
}

/// Runs `cleanup` once on the first SIGINT or SIGTERM, passing the signal number.
pub fn install_signal_handlers<F>(cleanup: F) -> io::Result<SignalHookGuard>
where
    F: Fn(i32) + Send + Sync + 'static,
{
    let cleanup = Arc::new(cleanup);
    let ran = Arc::new(AtomicBool::new(false));
    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM])?;
    let handle = signals.handle();

    let thread = thread::spawn(move || {
        for signal in signals.forever() {
            run_cleanup_once(&cleanup, &ran, signal);
        }
    });

    Ok(SignalHookGuard {
        handle,
        thread: Some(thread),
    })
}

/// Conventional exit status for a process ended by `signal`.
pub fn signal_exit_code(signal: i32) -> i32 {
    128 + signal
}
