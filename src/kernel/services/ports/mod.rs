//! Service ports: traits + data contracts.

pub mod host;
pub mod runtime;
pub mod settings;

pub use host::{
    CommandOutput, DirEntryInfo, FileFilter, HostError, HostResult, HostRuntime, SessionId,
    ShellKind,
};
pub use runtime::{AsyncExecutor, BoxFuture};
pub use settings::{ExplorerSettings, Settings, ShellSettings};
