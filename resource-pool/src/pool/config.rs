use std::future::Future;
use std::time::Duration;

use futures_lite::future::FutureExt;

use super::error::ConfigError;
use super::pool::{CreateFn, Pool, PoolInternal};
use crate::executor::{default_executor, Executor};
use crate::resource::Resource;

const DEFAULT_MIN_COUNT: usize = 1;
const DEFAULT_MAX_COUNT: usize = 10;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Builder for a [`Pool`].
pub struct PoolConfig<T, E> {
    create: CreateFn<T, E>,
    executor: Option<Box<dyn Executor>>,
    idle_timeout: Duration,
    min_count: usize,
    max_count: usize,
}

impl<T: Resource, E: Send + 'static> PoolConfig<T, E> {
    /// Start a configuration with the factory used to create new resources.
    /// The pool retains 1 idle resource, allows 10 live resources and
    /// reclaims idle resources after 60 seconds unless configured otherwise.
    pub fn new<C, F>(create: C) -> Self
    where
        C: Fn() -> F + Send + Sync + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            create: Box::new(move || create().boxed()),
            executor: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            min_count: DEFAULT_MIN_COUNT,
            max_count: DEFAULT_MAX_COUNT,
        }
    }

    /// Set the executor used for background destroy and create operations.
    pub fn executor<X>(mut self, executor: X) -> Self
    where
        X: Executor + 'static,
    {
        self.executor.replace(Box::new(executor));
        self
    }

    /// Set how long a resource may sit idle before it can be reclaimed. With
    /// a zero duration, idle resources above the minimum are closed almost as
    /// soon as they are released.
    pub fn idle_timeout(mut self, val: Duration) -> Self {
        self.idle_timeout = val;
        self
    }

    pub fn max_count(mut self, val: usize) -> Self {
        self.max_count = val;
        self
    }

    pub fn min_count(mut self, val: usize) -> Self {
        self.min_count = val;
        self
    }

    pub fn build(self) -> Result<Pool<T, E>, ConfigError> {
        if self.max_count == 0 {
            return Err(ConfigError("max_count must be at least 1".to_owned()));
        }
        let executor = match self.executor {
            Some(executor) => executor,
            None => default_executor()?,
        };
        Ok(Pool::new(PoolInternal::new(
            self.create,
            executor,
            self.idle_timeout,
            self.min_count,
            self.max_count,
        )))
    }
}
