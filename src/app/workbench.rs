use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::kernel::services::adapters::TokioExecutor;
use crate::kernel::services::ports::{AsyncExecutor, HostRuntime, Settings};
use crate::kernel::services::{KernelMessage, KernelServiceHost};
use crate::kernel::{Action, AppState, Notification, Store};

const MAX_KERNEL_BUS_DRAIN_PER_PUMP: usize = 1024;

/// Owns the stores and the host bridge. All state changes happen on the
/// thread that calls [`Workbench::dispatch`] and [`Workbench::pump`].
pub struct Workbench {
    store: Store,
    kernel_services: KernelServiceHost,
}

impl Workbench {
    pub fn new(
        state: AppState,
        executor: Arc<dyn AsyncExecutor>,
        runtime: Arc<dyn HostRuntime>,
    ) -> Self {
        Self {
            store: Store::new(state),
            kernel_services: KernelServiceHost::new(executor, runtime),
        }
    }

    /// Workbench on its own tokio runtime.
    pub fn with_runtime(settings: Settings, runtime: Arc<dyn HostRuntime>) -> std::io::Result<Self> {
        let executor = Arc::new(TokioExecutor::new()?);
        Ok(Self::new(AppState::new(settings), executor, runtime))
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn host(&self) -> &Arc<dyn HostRuntime> {
        self.kernel_services.runtime()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.store.take_notifications()
    }

    /// Reduces `action` and starts whatever host work it asked for. Returns
    /// whether observable state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        self.kernel_services.run_effects(result.effects);
        result.state_changed
    }

    /// Applies every host reply that has already arrived.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        let mut drained = 0usize;
        while drained < MAX_KERNEL_BUS_DRAIN_PER_PUMP {
            match self.kernel_services.try_recv() {
                Ok(KernelMessage::Action(action)) => {
                    drained += 1;
                    changed |= self.dispatch(action);
                }
                Err(_) => break,
            }
        }
        changed
    }

    /// Blocks on host replies until `done` holds or `timeout` passes.
    /// Returns the final value of `done`.
    pub fn pump_until(
        &mut self,
        timeout: Duration,
        mut done: impl FnMut(&AppState) -> bool,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if done(self.state()) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.kernel_services.recv_timeout(remaining) {
                Ok(KernelMessage::Action(action)) => {
                    self.dispatch(action);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return done(self.state());
                }
            }
        }
    }

    /// Waits until no reply arrives for `quiet`, bounded by `timeout`.
    pub fn settle(&mut self, quiet: Duration, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut changed = false;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return changed;
            }
            match self.kernel_services.recv_timeout(quiet.min(remaining)) {
                Ok(KernelMessage::Action(action)) => changed |= self.dispatch(action),
                Err(_) => return changed,
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/workbench.rs"]
mod tests;
