mod acquire;
pub use acquire::Acquire;

mod config;
pub use config::PoolConfig;

mod error;
pub use error::{AcquireError, ConfigError};

mod pool;
pub use pool::Pool;

mod reaper;

mod wait;
