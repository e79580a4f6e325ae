//! A bounded pool of reusable, expensive-to-create resources.
//!
//! At most `max_count` resources are live at any time. Callers acquiring
//! from an exhausted pool wait in FIFO order, idle resources beyond
//! `min_count` are closed once they exceed the idle timeout, and a
//! resource known to be broken can be discarded instead of recycled.

mod executor;
#[cfg(feature = "global-exec")]
pub use self::executor::GlobalExecutor;
pub use self::executor::{default_executor, Executor};

mod pool;
pub use self::pool::{Acquire, AcquireError, ConfigError, Pool, PoolConfig};

mod resource;
pub use self::resource::{Discard, Managed, Resource};
