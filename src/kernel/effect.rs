use std::path::PathBuf;
use std::time::Duration;

use crate::kernel::documents::DocumentId;
use crate::kernel::explorer::{ListingRequest, RootRequest};
use crate::kernel::services::ports::{FileFilter, SessionId, ShellKind};
use crate::kernel::terminal::RunRequest;

/// Host-runtime work requested by a dispatch. Each one comes back as an
/// [`Action`](crate::kernel::Action).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PickFile,
    PickFolder,
    PickSavePath {
        id: DocumentId,
        default_name: String,
        filters: Vec<FileFilter>,
    },
    ReadFile(PathBuf),
    WriteFile {
        id: DocumentId,
        path: PathBuf,
        content: String,
        version: u64,
    },
    ListRoot(RootRequest),
    ListDirectory(ListingRequest),
    CreateSession {
        shell: ShellKind,
        working_directory: PathBuf,
    },
    TerminateSession(SessionId),
    RunCommand(RunRequest),
    QueryWorkingDirectory {
        session: SessionId,
        delay: Duration,
    },
}
