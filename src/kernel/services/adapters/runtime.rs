//! Tokio-backed executor for host calls.

use std::io;
use std::time::Duration;

use crate::kernel::services::ports::{AsyncExecutor, BoxFuture};

pub struct TokioExecutor {
    runtime: tokio::runtime::Runtime,
}

impl TokioExecutor {
    pub fn new() -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("deskcore-host")
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }
}

impl AsyncExecutor for TokioExecutor {
    fn spawn(&self, task: BoxFuture) {
        self.runtime.spawn(task);
    }

    fn spawn_after(&self, delay: Duration, task: BoxFuture) {
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }
}
