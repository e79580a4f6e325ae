use futures_lite::future::Boxed as BoxFuture;

use super::Executor;

/// Runs pool tasks on the shared `async-global-executor` thread pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalExecutor;

impl Executor for GlobalExecutor {
    fn spawn_ok(&self, task: BoxFuture<()>) {
        async_global_executor::spawn(task).detach()
    }
}
