use std::fmt::{self, Debug, Display, Formatter};
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_channel::oneshot;

use super::Recycle;

/// An acquired resource. The holder has exclusive use of the value until it
/// is released, either by dropping the `Managed` instance or through
/// [`Managed::release`], or destroyed through [`Managed::discard`].
pub struct Managed<T: 'static> {
    pool: Option<Arc<dyn Recycle<T>>>,
    value: Option<T>,
}

impl<T: 'static> Managed<T> {
    pub(crate) fn new(value: T, pool: Arc<dyn Recycle<T>>) -> Self {
        Self {
            pool: Some(pool),
            value: Some(value),
        }
    }

    /// Return the resource to the pool for reuse.
    pub fn release(mng_self: Self) {
        drop(mng_self)
    }

    /// Destroy the resource rather than returning it to the pool, for use
    /// when it is known to be in a broken state. The resource is closed in
    /// the background; the returned future resolves once the pool no longer
    /// counts it.
    pub fn discard(mut mng_self: Self) -> Discard {
        match (mng_self.pool.take(), mng_self.value.take()) {
            (Some(pool), Some(value)) => pool.discard(value),
            _ => Discard::complete(),
        }
    }
}

impl<T: Debug + 'static> Debug for Managed<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("Managed")
                .field("value", self.deref())
                .finish()
        } else {
            Debug::fmt(self.deref(), f)
        }
    }
}

impl<T: Display + 'static> Display for Managed<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.deref(), f)
    }
}

impl<T: 'static> Deref for Managed<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // the value is only taken when the handle is consumed
        self.value.as_ref().unwrap()
    }
}

impl<T: 'static> DerefMut for Managed<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.value.as_mut().unwrap()
    }
}

impl<T: 'static> Drop for Managed<T> {
    fn drop(&mut self) {
        if let (Some(pool), Some(value)) = (self.pool.take(), self.value.take()) {
            pool.release(value);
        }
    }
}

/// A Future which resolves once a discarded resource has been closed and
/// removed from the pool's count. Dropping it does not cancel the discard.
#[must_use = "Discard completes in the background unless awaited"]
pub struct Discard {
    receive: Option<oneshot::Receiver<()>>,
}

impl Discard {
    pub(crate) fn new(receive: oneshot::Receiver<()>) -> Self {
        Self {
            receive: Some(receive),
        }
    }

    pub(crate) fn complete() -> Self {
        Self { receive: None }
    }
}

impl Debug for Discard {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discard")
            .field("complete", &self.receive.is_none())
            .finish()
    }
}

impl Future for Discard {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.receive.as_mut() {
            None => Poll::Ready(()),
            Some(receive) => match Pin::new(receive).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(_) => {
                    // a dropped sender means the destroy task went away,
                    // there is nothing left to wait for
                    self.receive.take();
                    Poll::Ready(())
                }
            },
        }
    }
}
