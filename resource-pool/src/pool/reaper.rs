use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};
use std::thread;
use std::time::Duration;

use event_listener::Event;
use log::trace;

/// A pool which can evict its expired idle resources.
pub trait Reclaim: Send + Sync + 'static {
    fn reclaim_idle(self: Arc<Self>);
}

struct Signal {
    stopped: AtomicBool,
    event: Event,
}

/// Handle to the background thread which periodically reclaims idle
/// resources. The thread holds only a weak reference to the pool, so it
/// also exits once every pool handle has been dropped.
pub struct Reaper {
    signal: Arc<Signal>,
}

impl Reaper {
    pub fn start<P: Reclaim>(pool: Weak<P>, period: Duration) -> Self {
        let signal = Arc::new(Signal {
            stopped: AtomicBool::new(false),
            event: Event::new(),
        });
        let sig = signal.clone();
        thread::spawn(move || run(pool, period, sig));
        Self { signal }
    }

    pub fn stop(&self) {
        self.signal.stopped.store(true, Ordering::Release);
        self.signal.event.notify(usize::MAX);
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<P: Reclaim>(pool: Weak<P>, period: Duration, signal: Arc<Signal>) {
    loop {
        // Register before checking the flag so a stop cannot be missed
        let listener = signal.event.listen();
        if signal.stopped.load(Ordering::Acquire) {
            break;
        }
        if listener.wait_timeout(period) {
            // notified by stop()
            break;
        }
        match pool.upgrade() {
            Some(pool) => pool.reclaim_idle(),
            None => break,
        }
    }
    trace!("Idle reaper stopped");
}
