use anyhow::{anyhow, Result};
use narcissus::log_debug;
use std::sync::atomic::{AtomicBool, Ordering};

/// Raised by SIGINT/SIGTERM; the runtime loop polls it every iteration.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Only touches an atomic (async-signal-safe).
extern "C" fn handle_shutdown(_: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

pub(crate) fn install_shutdown_handler() -> Result<()> {
    for (signal, name) in [(libc::SIGINT, "SIGINT"), (libc::SIGTERM, "SIGTERM")] {
        unsafe {
            // SAFETY: handle_shutdown only stores to an atomic flag.
            let handler = handle_shutdown as *const () as libc::sighandler_t;
            if libc::signal(signal, handler) == libc::SIG_ERR {
                log_debug(&format!("failed to install {name} handler"));
                return Err(anyhow!("failed to install {name} handler"));
            }
        }
    }
    Ok(())
}

pub(crate) fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN_REQUESTED
}
