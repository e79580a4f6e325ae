use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use futures_lite::future::{block_on, Boxed as BoxFuture, FutureExt};

use resource_pool::{Executor, PoolConfig, Resource};

#[derive(Debug)]
pub struct AtomicCounter {
    count: AtomicUsize,
}

#[allow(unused)]
impl AtomicCounter {
    pub fn new(val: usize) -> Self {
        Self {
            count: AtomicUsize::new(val),
        }
    }

    pub fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn decrement(&self) -> usize {
        self.count.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub fn value(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

#[derive(Debug, PartialEq)]
pub struct CreateError;

/// A stand-in for a database connection which records its lifecycle.
#[derive(Debug)]
pub struct Conn {
    pub id: usize,
    pub dirty: bool,
    tracker: Arc<Tracker>,
}

impl Resource for Conn {
    fn reset(&mut self) {
        self.dirty = false;
        self.tracker.resets.increment();
    }

    fn close(self) -> BoxFuture<()> {
        let tracker = self.tracker.clone();
        async move {
            tracker.closed.increment();
        }
        .boxed()
    }
}

/// Shared lifecycle counters for the resources of one pool.
#[derive(Debug, Default)]
pub struct Tracker {
    pub created: AtomicCounter,
    pub closed: AtomicCounter,
    pub resets: AtomicCounter,
    pub fail_create: AtomicBool,
}

#[allow(unused)]
impl Tracker {
    pub fn set_fail(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }
}

pub fn conn_pool_config(tracker: &Arc<Tracker>) -> PoolConfig<Conn, CreateError> {
    let tracker = tracker.clone();
    PoolConfig::new(move || {
        let tracker = tracker.clone();
        async move {
            if tracker.fail_create.load(Ordering::SeqCst) {
                Err(CreateError)
            } else {
                Ok(Conn {
                    id: tracker.created.increment(),
                    dirty: false,
                    tracker: tracker.clone(),
                })
            }
        }
    })
}

/// Poll a condition until it holds or the timeout elapses.
#[allow(unused)]
pub fn wait_until<F>(timeout: Duration, mut cond: F) -> bool
where
    F: FnMut() -> bool,
{
    let expire = Instant::now() + timeout;
    loop {
        if cond() {
            break true;
        }
        if Instant::now() >= expire {
            break false;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

/// An executor which only runs spawned tasks when asked, so tests can step
/// through background work.
#[derive(Clone, Default)]
pub struct QueueExecutor {
    tasks: Arc<Mutex<VecDeque<BoxFuture<()>>>>,
}

#[allow(unused)]
impl QueueExecutor {
    pub fn run_one(&self) -> bool {
        let task = self.tasks.lock().unwrap().pop_front();
        match task {
            Some(task) => {
                block_on(task);
                true
            }
            None => false,
        }
    }

    pub fn run_all(&self) -> usize {
        let mut count = 0;
        while self.run_one() {
            count += 1;
        }
        count
    }
}

impl Executor for QueueExecutor {
    fn spawn_ok(&self, task: BoxFuture<()>) {
        self.tasks.lock().unwrap().push_back(task);
    }
}
