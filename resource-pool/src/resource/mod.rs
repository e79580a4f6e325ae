use std::sync::Arc;

use futures_lite::future::{self, Boxed as BoxFuture, FutureExt};

mod managed;
pub use managed::{Discard, Managed};

/// The capabilities a pool requires of the objects it manages.
///
/// Both methods have defaults, so a type with no per-use state and nothing
/// to tear down can implement the trait with an empty `impl` block.
pub trait Resource: Send + Sized + 'static {
    /// Clear any per-use state before the resource is handed to its next
    /// holder. Called on every release; failures are not reported.
    fn reset(&mut self) {}

    /// Tear down the resource. The pool counts the resource as gone once the
    /// returned future completes, so it must always complete eventually.
    fn close(self) -> BoxFuture<()> {
        future::ready(()).boxed()
    }
}

/// Returns a checked-out resource to the pool it was acquired from.
pub(crate) trait Recycle<T>: Send + Sync {
    fn release(self: Arc<Self>, res: T);

    fn discard(self: Arc<Self>, res: T) -> Discard;
}
