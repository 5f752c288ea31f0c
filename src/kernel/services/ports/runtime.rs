use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Where host calls run. The kernel never blocks on them.
pub trait AsyncExecutor: Send + Sync {
    fn spawn(&self, task: BoxFuture);

    /// Runs `task` after `delay`.
    fn spawn_after(&self, delay: Duration, task: BoxFuture);
}
