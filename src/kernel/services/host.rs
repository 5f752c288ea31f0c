use std::future::Future;
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use super::bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
use super::ports::{AsyncExecutor, BoxFuture, HostRuntime};
use crate::kernel::{Action, Effect};

/// Runs effects against the host runtime and collects the replies.
pub struct KernelServiceHost {
    bus: KernelBusSender,
    rx: KernelBusReceiver,
    executor: Arc<dyn AsyncExecutor>,
    runtime: Arc<dyn HostRuntime>,
}

#[derive(Clone)]
pub struct KernelServiceContext {
    bus: KernelBusSender,
    executor: Arc<dyn AsyncExecutor>,
}

impl KernelServiceHost {
    pub fn new(executor: Arc<dyn AsyncExecutor>, runtime: Arc<dyn HostRuntime>) -> Self {
        let (bus, rx) = kernel_bus();
        Self {
            bus,
            rx,
            executor,
            runtime,
        }
    }

    pub fn context(&self) -> KernelServiceContext {
        KernelServiceContext {
            bus: self.bus.clone(),
            executor: Arc::clone(&self.executor),
        }
    }

    pub fn runtime(&self) -> &Arc<dyn HostRuntime> {
        &self.runtime
    }

    pub fn try_recv(&mut self) -> Result<KernelMessage, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<KernelMessage, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    /// Spawns the host call for `effect`. Its outcome comes back on the bus
    /// as exactly one action.
    pub fn run_effect(&self, effect: Effect) {
        tracing::debug!(?effect, "run effect");
        let ctx = self.context();
        let host = Arc::clone(&self.runtime);

        match effect {
            Effect::PickFile => self.spawn(async move {
                let result = host.open_file_picker().await;
                ctx.dispatch(Action::FilePicked(result));
            }),
            Effect::PickFolder => self.spawn(async move {
                let result = host.open_folder_picker().await;
                ctx.dispatch(Action::FolderPicked(result));
            }),
            Effect::PickSavePath {
                id,
                default_name,
                filters,
            } => self.spawn(async move {
                let result = host.open_save_dialog(&default_name, &filters).await;
                ctx.dispatch(Action::SavePathChosen { id, result });
            }),
            Effect::ReadFile(path) => self.spawn(async move {
                let action = match host.read_file(&path).await {
                    Ok(content) => Action::FileLoaded { path, content },
                    Err(error) => Action::FileLoadFailed { path, error },
                };
                ctx.dispatch(action);
            }),
            Effect::WriteFile {
                id,
                path,
                content,
                version,
            } => self.spawn(async move {
                let action = match host.write_file(&path, &content).await {
                    Ok(()) => Action::FileSaved { id, path, version },
                    Err(error) => Action::FileSaveFailed { id, path, error },
                };
                ctx.dispatch(action);
            }),
            Effect::ListRoot(request) => self.spawn(async move {
                let token = request.token;
                let path = request.path;
                let action = match host.list_directory(&path).await {
                    Ok(entries) => Action::RootListed {
                        token,
                        path,
                        entries,
                    },
                    Err(error) => Action::RootListFailed { token, path, error },
                };
                ctx.dispatch(action);
            }),
            Effect::ListDirectory(request) => self.spawn(async move {
                let generation = request.generation;
                let path = request.path;
                let action = match host.list_directory(&path).await {
                    Ok(entries) => Action::DirListed {
                        generation,
                        path,
                        entries,
                    },
                    Err(error) => Action::DirListFailed {
                        generation,
                        path,
                        error,
                    },
                };
                ctx.dispatch(action);
            }),
            Effect::CreateSession {
                shell,
                working_directory,
            } => self.spawn(async move {
                let action = match host.create_session(shell, &working_directory).await {
                    Ok(id) => Action::SessionCreated {
                        id,
                        shell,
                        working_directory,
                    },
                    Err(error) => Action::SessionCreateFailed { shell, error },
                };
                ctx.dispatch(action);
            }),
            Effect::TerminateSession(id) => self.spawn(async move {
                if let Err(error) = host.terminate_session(id).await {
                    ctx.dispatch(Action::SessionTerminateFailed { id, error });
                }
            }),
            Effect::RunCommand(request) => self.spawn(async move {
                let result = host
                    .run_command(request.session, &request.command, &request.working_directory)
                    .await;
                ctx.dispatch(Action::CommandFinished {
                    session: request.session,
                    result,
                });
            }),
            Effect::QueryWorkingDirectory { session, delay } => self.executor.spawn_after(
                delay,
                Box::pin(async move {
                    let result = host.query_working_directory(session).await;
                    ctx.dispatch(Action::WorkingDirectoryResolved { session, result });
                }),
            ),
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.executor.spawn(Box::pin(task));
    }
}

impl KernelServiceContext {
    pub fn dispatch(&self, action: Action) {
        if self.bus.send_action(action).is_err() {
            tracing::debug!("kernel bus closed, dropping reply");
        }
    }

    pub fn spawn(&self, task: BoxFuture) {
        self.executor.spawn(task);
    }

    pub fn spawn_after(&self, delay: Duration, task: BoxFuture) {
        self.executor.spawn_after(delay, task);
    }

    pub fn spawn_future<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.executor.spawn(Box::pin(task));
    }
}
