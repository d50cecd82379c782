//! Progress polling
//!
//! The poller is a background thread that calls a tick callback at a fixed
//! period while armed. It is armed and disarmed from native callbacks; the
//! tick callback re-checks playback state itself, so a tick racing a
//! disarm is harmless.

use crate::utils::duration_ratio;
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Fraction of `duration` reached at `position`, in `[0, 1]`.
///
/// Unknown or zero duration yields 0.
pub fn compute_progress(position: Duration, duration: Duration) -> f64 {
    duration_ratio(position, duration).clamp(0.0, 1.0)
}

enum PollerControl {
    Arm(Duration),
    Disarm,
    Shutdown,
}

/// Periodic timer that can be re-armed and disarmed
pub struct ProgressPoller {
    control: Sender<PollerControl>,
    armed: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ProgressPoller {
    /// Start the timer thread, initially disarmed
    pub fn spawn<F>(on_tick: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (control, rx) = unbounded::<PollerControl>();
        let armed = Arc::new(AtomicBool::new(false));

        let thread = thread::spawn(move || {
            let mut schedule: Option<(Duration, Instant)> = None;

            loop {
                let message = match schedule {
                    Some((_, next_tick)) => match rx.recv_deadline(next_tick) {
                        Ok(message) => Some(message),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    },
                    None => match rx.recv() {
                        Ok(message) => Some(message),
                        Err(_) => break,
                    },
                };

                match message {
                    None => {
                        on_tick();
                        if let Some((period, next_tick)) = schedule.as_mut() {
                            let now = Instant::now();
                            *next_tick += *period;
                            // Fell behind; restart the cadence from now
                            if *next_tick < now {
                                *next_tick = now + *period;
                            }
                        }
                    }
                    // First tick fires right away, as a zero due time would
                    Some(PollerControl::Arm(period)) => schedule = Some((period, Instant::now())),
                    Some(PollerControl::Disarm) => schedule = None,
                    Some(PollerControl::Shutdown) => break,
                }
            }
        });

        Self {
            control,
            armed,
            thread: Some(thread),
        }
    }

    /// Tick every `period`, starting now
    pub fn arm(&self, period: Duration) {
        debug!("Progress poller armed at {:?}", period);
        self.armed.store(true, Ordering::SeqCst);
        self.send(PollerControl::Arm(period));
    }

    /// Stop ticking until re-armed
    pub fn disarm(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            debug!("Progress poller disarmed");
        }
        self.send(PollerControl::Disarm);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    fn send(&self, control: PollerControl) {
        if self.control.send(control).is_err() {
            warn!("Progress poller thread is gone");
        }
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        let _ = self.control.send(PollerControl::Shutdown);

        if let Some(handle) = self.thread.take() {
            // The last owner may be released from inside a tick
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}
