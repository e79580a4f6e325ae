use std::collections::VecDeque;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures_channel::oneshot;
use futures_lite::future::{Boxed as BoxFuture, FutureExt};
use log::{debug, trace};

use super::acquire::Acquire;
use super::error::ConfigError;
use super::reaper::{Reaper, Reclaim};
use super::wait::{WaitId, WaitQueue, WaitResponder, Waiter};
use crate::executor::Executor;
use crate::resource::{Discard, Recycle, Resource};

pub type ResourceFuture<T, E> = BoxFuture<Result<T, E>>;

pub type CreateFn<T, E> = Box<dyn Fn() -> ResourceFuture<T, E> + Send + Sync>;

struct IdleResource<T> {
    res: T,
    since: Instant,
}

struct PoolState<T, E> {
    /// Live resources: idle, in use, or being closed
    allocated: usize,
    /// Capacity reserved for creations in flight
    creating: usize,
    closed: bool,
    min_count: usize,
    max_count: usize,
    /// Oldest at the front, most recently released at the back
    idle: VecDeque<IdleResource<T>>,
    waiters: WaitQueue<T, E>,
    reaper: Option<Reaper>,
}

impl<T, E> PoolState<T, E> {
    fn has_capacity(&self) -> bool {
        self.allocated + self.creating < self.max_count
    }

    /// Reserve capacity for the oldest queued waiters. Must be called in the
    /// same critical section that frees capacity, so that no newer request
    /// can claim it first.
    fn reserve_for_waiters(&mut self) -> Vec<WaitResponder<T, E>> {
        let mut reserved = Vec::new();
        while !self.closed && self.has_capacity() {
            match self.waiters.pop() {
                Some(waiter) => {
                    self.creating += 1;
                    reserved.push(waiter);
                }
                None => break,
            }
        }
        reserved
    }
}

/// Shortest interval between idle reclamation passes.
const MIN_REAP_PERIOD: Duration = Duration::from_millis(1);

/// The result of trying to obtain a resource without suspending.
pub(crate) enum Reserve<T, E> {
    Idle(T),
    Create(ResourceFuture<T, E>),
    Wait(WaitId, Waiter<T, E>),
    Closed,
}

pub(crate) struct PoolInternal<T: Resource, E: Send + 'static> {
    create: CreateFn<T, E>,
    executor: Box<dyn Executor>,
    idle_timeout: Duration,
    state: Mutex<PoolState<T, E>>,
}

impl<T: Resource, E: Send + 'static> PoolInternal<T, E> {
    pub fn new(
        create: CreateFn<T, E>,
        executor: Box<dyn Executor>,
        idle_timeout: Duration,
        min_count: usize,
        max_count: usize,
    ) -> Self {
        Self {
            create,
            executor,
            idle_timeout,
            state: Mutex::new(PoolState {
                allocated: 0,
                creating: 0,
                closed: false,
                min_count,
                max_count,
                idle: VecDeque::new(),
                waiters: WaitQueue::new(),
                reaper: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<T, E>> {
        // No user code runs while the lock is held, so the state is
        // consistent even if another thread panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the most recently released idle resource, or reserve capacity
    /// for a new one, or else join the wait queue.
    pub fn reserve(self: &Arc<Self>) -> Reserve<T, E> {
        let mut state = self.lock();
        if state.closed {
            return Reserve::Closed;
        }
        if let Some(idle) = state.idle.pop_back() {
            trace!("Acquired idle resource");
            return Reserve::Idle(idle.res);
        }
        if state.has_capacity() && state.waiters.is_empty() {
            state.creating += 1;
            drop(state);
            return Reserve::Create((self.create)());
        }
        // older requests are served first, even when capacity is free
        let (id, waiter) = state.waiters.push();
        trace!("Queued waiter ({} waiting)", state.waiters.len());
        let reserved = state.reserve_for_waiters();
        drop(state);
        self.create_for_waiters(reserved);
        Reserve::Wait(id, waiter)
    }

    /// Settle a capacity reservation made by `reserve` or on behalf of a waiter.
    pub fn created(self: &Arc<Self>, result: Result<T, E>) -> Result<T, E> {
        let mut state = self.lock();
        state.creating -= 1;
        match result {
            Ok(res) => {
                state.allocated += 1;
                debug!("Created resource ({} allocated)", state.allocated);
                Ok(res)
            }
            Err(err) => {
                let reserved = state.reserve_for_waiters();
                drop(state);
                debug!("Resource creation failed");
                self.create_for_waiters(reserved);
                Err(err)
            }
        }
    }

    pub fn release_resource(self: &Arc<Self>, mut res: T) {
        res.reset();
        let mut state = self.lock();
        let res = match state.waiters.resolve(res) {
            None => {
                trace!("Released resource to waiter");
                return;
            }
            Some(res) => res,
        };
        if state.closed || state.idle.len() >= state.max_count {
            drop(state);
            debug!("Pool is full or closed, destroying released resource");
            self.destroy(res);
            return;
        }
        state.idle.push_back(IdleResource {
            res,
            since: Instant::now(),
        });
        if state.reaper.is_none() {
            let period = self.idle_timeout.max(MIN_REAP_PERIOD);
            state
                .reaper
                .replace(Reaper::start(Arc::downgrade(self), period));
        }
    }

    pub fn discard_resource(self: &Arc<Self>, res: T) -> Discard {
        let (send, receive) = oneshot::channel();
        let dispose = self.dispose(res);
        self.executor.spawn_ok(
            async move {
                dispose.await;
                send.send(()).unwrap_or(());
            }
            .boxed(),
        );
        Discard::new(receive)
    }

    /// Withdraw a queued acquire. A resource already delivered to it is
    /// returned to the pool.
    pub fn abandon_wait(self: &Arc<Self>, id: WaitId, mut waiter: Waiter<T, E>) {
        let mut state = self.lock();
        if state.waiters.remove(id) {
            return;
        }
        // Deliveries happen under the lock, so nothing can arrive once the
        // receiver is dropped here.
        let delivered = waiter.try_recv();
        drop(waiter);
        drop(state);
        if let Ok(Some(Ok(res))) = delivered {
            trace!("Acquire abandoned after delivery, releasing resource");
            self.release_resource(res);
        }
    }

    /// Finish a creation whose acquire was dropped, keeping the result.
    pub fn abandon_create(self: &Arc<Self>, create: ResourceFuture<T, E>) {
        let pool = self.clone();
        self.executor.spawn_ok(
            async move {
                if let Ok(res) = pool.created(create.await) {
                    pool.release_resource(res);
                }
            }
            .boxed(),
        );
    }

    /// Create a resource for each waiter which already holds a capacity
    /// reservation.
    fn create_for_waiters(self: &Arc<Self>, reserved: Vec<WaitResponder<T, E>>) {
        for waiter in reserved {
            trace!("Creating resource for queued waiter");
            let create = (self.create)();
            let pool = self.clone();
            self.executor.spawn_ok(
                async move {
                    let result = pool.created(create.await);
                    pool.deliver(waiter, result);
                }
                .boxed(),
            );
        }
    }

    fn deliver(self: &Arc<Self>, waiter: WaitResponder<T, E>, result: Result<T, E>) {
        let state = self.lock();
        match waiter.send(result) {
            Ok(()) => (),
            Err(Ok(res)) => {
                drop(state);
                trace!("Waiter went away, releasing created resource");
                self.release_resource(res);
            }
            Err(Err(_)) => {
                trace!("Waiter went away, dropping creation error");
            }
        }
    }

    fn destroy(self: &Arc<Self>, res: T) {
        self.executor.spawn_ok(self.dispose(res));
    }

    /// Close a resource, then stop counting it.
    fn dispose(self: &Arc<Self>, res: T) -> BoxFuture<()> {
        let pool = self.clone();
        let close = res.close();
        async move {
            close.await;
            pool.disposed();
        }
        .boxed()
    }

    fn disposed(self: &Arc<Self>) {
        let mut state = self.lock();
        state.allocated = state.allocated.saturating_sub(1);
        debug!("Destroyed resource ({} allocated)", state.allocated);
        let reserved = state.reserve_for_waiters();
        drop(state);
        self.create_for_waiters(reserved);
    }

    fn set_max_count(self: &Arc<Self>, val: usize) {
        let mut state = self.lock();
        state.max_count = val;
        let reserved = state.reserve_for_waiters();
        drop(state);
        self.create_for_waiters(reserved);
    }

    pub fn close(self: &Arc<Self>) -> BoxFuture<()> {
        let pool = self.clone();
        async move {
            pool.lock().closed = true;
            loop {
                let next = pool.lock().idle.pop_back();
                match next {
                    // one at a time, to limit pressure on the backing system
                    Some(idle) => pool.dispose(idle.res).await,
                    None => break,
                }
            }
            let reaper = pool.lock().reaper.take();
            if let Some(reaper) = reaper {
                reaper.stop();
            }
            debug!("Pool closed");
        }
        .boxed()
    }
}

impl<T: Resource, E: Send + 'static> Reclaim for PoolInternal<T, E> {
    fn reclaim_idle(self: Arc<Self>) {
        let timeout = self.idle_timeout;
        let now = Instant::now();
        let mut expired = Vec::new();
        {
            let mut state = self.lock();
            while state.idle.len() > state.min_count {
                let head_expired = state
                    .idle
                    .front()
                    .map(|idle| idle.since + timeout <= now)
                    .unwrap_or(false);
                if !head_expired {
                    break;
                }
                if let Some(idle) = state.idle.pop_front() {
                    expired.push(idle.res);
                }
            }
        }
        if !expired.is_empty() {
            debug!("Reclaiming {} idle resource(s)", expired.len());
        }
        for res in expired {
            self.destroy(res);
        }
    }
}

impl<T: Resource, E: Send + 'static> Drop for PoolInternal<T, E> {
    fn drop(&mut self) {
        // the pool was dropped without being closed
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if !state.idle.is_empty() {
            debug!("Pool dropped, closing {} idle resource(s)", state.idle.len());
        }
        for idle in state.idle.drain(..) {
            self.executor.spawn_ok(idle.res.close());
        }
    }
}

impl<T: Resource, E: Send + 'static> Recycle<T> for PoolInternal<T, E> {
    fn release(self: Arc<Self>, res: T) {
        self.release_resource(res)
    }

    fn discard(self: Arc<Self>, res: T) -> Discard {
        self.discard_resource(res)
    }
}

/// A resource pool instance, which handles acquisition of managed resources
/// of type `T`. Cloning a `Pool` produces another handle to the same pool.
///
/// Dropping the last handle without calling [`Pool::close`] still closes the
/// idle resources, in the background on the pool's executor.
pub struct Pool<T: Resource, E: Send + 'static> {
    pub(crate) inner: Arc<PoolInternal<T, E>>,
}

impl<T: Resource, E: Send + 'static> Pool<T, E> {
    pub(crate) fn new(inner: PoolInternal<T, E>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns an `Acquire<T, E>` which is a `Future` that resolves to either
    /// a `Managed<T>` wrapper around an acquired resource, or an
    /// `AcquireError<E>`.
    ///
    /// An idle resource is returned without suspending. Otherwise a new
    /// resource is created if the pool is below its maximum, or the request
    /// waits for a resource to be released. Dropping the `Acquire` withdraws
    /// the request.
    pub fn acquire(&self) -> Acquire<T, E> {
        Acquire::new(self.clone())
    }

    /// Close every idle resource in turn and stop idle reclamation.
    ///
    /// Resources which are in use are not affected; they are destroyed when
    /// they are released. Requests already waiting are not rejected, but new
    /// calls to `acquire` fail with `AcquireError::PoolClosed`.
    pub async fn close(&self) {
        self.inner.close().await
    }

    /// Fetch the current number of allocated resources for this `Pool`
    /// instance.
    pub fn count(&self) -> usize {
        self.inner.lock().allocated
    }

    /// Fetch the number of resources waiting in the idle queue.
    pub fn idle_count(&self) -> usize {
        self.inner.lock().idle.len()
    }

    /// Fetch the number of pending acquire requests.
    pub fn waiter_count(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn min_count(&self) -> usize {
        self.inner.lock().min_count
    }

    pub fn max_count(&self) -> usize {
        self.inner.lock().max_count
    }

    /// Change the number of idle resources retained regardless of the idle
    /// timeout.
    pub fn set_min_count(&self, val: usize) {
        self.inner.lock().min_count = val;
    }

    /// Change the maximum number of allocated resources. Lowering the limit
    /// does not affect resources in use; the excess is destroyed as it is
    /// released.
    pub fn set_max_count(&self, val: usize) -> Result<(), ConfigError> {
        if val == 0 {
            return Err(ConfigError("max_count must be at least 1".to_owned()));
        }
        self.inner.set_max_count(val);
        Ok(())
    }
}

impl<T: Resource, E: Send + 'static> Clone for Pool<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Resource, E: Send + 'static> Debug for Pool<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Pool")
            .field("count", &state.allocated)
            .field("idle", &state.idle.len())
            .field("waiters", &state.waiters.len())
            .field("max_count", &state.max_count)
            .finish()
    }
}
