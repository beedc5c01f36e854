// src/lifecycle.rs
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crate::error::Result;

const POLL_STEP: Duration = Duration::from_millis(200);

/// Process-wide stop request shared between the signal handler and the control loop.
///
/// The handler only flips the flag. Hardware is touched solely by the thread that
/// owns the [`Fan`](crate::fan::Fan).
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes SIGINT, SIGTERM and SIGHUP to a new flag. Can only succeed once per process.
    pub fn install() -> Result<Self> {
        let shutdown = Self::new();
        let r = shutdown.clone();
        ctrlc::set_handler(move || r.request())?;
        Ok(shutdown)
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration`, waking early once a stop is requested.
    /// Returns whether a stop was requested.
    pub fn wait(&self, duration: Duration) -> bool {
        let start = Instant::now();
        while let Some(remaining) = duration.checked_sub(start.elapsed()) {
            if remaining.is_zero() || self.is_requested() {
                break;
            }
            thread::sleep(remaining.min(POLL_STEP));
        }
        self.is_requested()
    }
}
