use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use super::error::AcquireError;
use super::pool::{Pool, Reserve, ResourceFuture};
use super::wait::{WaitId, Waiter};
use crate::resource::{Managed, Resource};

enum AcquireState<T, E> {
    Init,
    Create(ResourceFuture<T, E>),
    Waiting(WaitId, Waiter<T, E>),
}

/// A Future resolving to a `Managed<T>` or an `AcquireError`.
///
/// Once it has resolved, polling it again returns `Poll::Pending`.
#[must_use = "Acquire does nothing unless polled"]
pub struct Acquire<T: Resource, E: Send + 'static> {
    pool: Pool<T, E>,
    state: Option<AcquireState<T, E>>,
}

impl<T: Resource, E: Send + 'static> Acquire<T, E> {
    pub(crate) fn new(pool: Pool<T, E>) -> Self {
        Self {
            pool,
            state: Some(AcquireState::Init),
        }
    }

    fn managed(&self, res: T) -> Managed<T> {
        Managed::new(res, self.pool.inner.clone())
    }
}

impl<T: Resource, E: Send + 'static> Future for Acquire<T, E> {
    type Output = Result<Managed<T>, AcquireError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = match self.state.take() {
            Some(state) => state,
            // already completed
            None => return Poll::Pending,
        };

        loop {
            state = match state {
                AcquireState::Init => match self.pool.inner.reserve() {
                    Reserve::Idle(res) => return Poll::Ready(Ok(self.managed(res))),
                    Reserve::Create(fut) => AcquireState::Create(fut),
                    Reserve::Wait(id, waiter) => AcquireState::Waiting(id, waiter),
                    Reserve::Closed => return Poll::Ready(Err(AcquireError::PoolClosed)),
                },

                AcquireState::Create(mut fut) => match fut.as_mut().poll(cx) {
                    Poll::Pending => {
                        self.state.replace(AcquireState::Create(fut));
                        return Poll::Pending;
                    }
                    Poll::Ready(result) => {
                        return Poll::Ready(match self.pool.inner.created(result) {
                            Ok(res) => Ok(self.managed(res)),
                            Err(err) => Err(AcquireError::CreateFailed(err)),
                        });
                    }
                },

                AcquireState::Waiting(id, mut waiter) => match Pin::new(&mut waiter).poll(cx) {
                    Poll::Pending => {
                        self.state.replace(AcquireState::Waiting(id, waiter));
                        return Poll::Pending;
                    }
                    Poll::Ready(Ok(Ok(res))) => return Poll::Ready(Ok(self.managed(res))),
                    Poll::Ready(Ok(Err(err))) => {
                        return Poll::Ready(Err(AcquireError::CreateFailed(err)))
                    }
                    // the pool dropped the request without an answer
                    Poll::Ready(Err(_)) => return Poll::Ready(Err(AcquireError::PoolClosed)),
                },
            };
        }
    }
}

impl<T: Resource, E: Send + 'static> Drop for Acquire<T, E> {
    fn drop(&mut self) {
        match self.state.take() {
            Some(AcquireState::Create(fut)) => self.pool.inner.abandon_create(fut),
            Some(AcquireState::Waiting(id, waiter)) => self.pool.inner.abandon_wait(id, waiter),
            _ => (),
        }
    }
}
