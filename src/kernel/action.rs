use std::path::PathBuf;

use crate::kernel::documents::DocumentId;
use crate::kernel::services::ports::{
    CommandOutput, DirEntryInfo, HostError, HostResult, SessionId, ShellKind,
};

/// Every input the kernel reacts to: user intents from the presentation layer
/// and replies from the host runtime.
#[derive(Debug, Clone)]
pub enum Action {
    OpenFileRequested,
    OpenPath(PathBuf),
    NewFile {
        name: String,
    },
    UpdateContent {
        id: DocumentId,
        text: String,
    },
    FocusDocument(DocumentId),
    CloseDocument(DocumentId),
    SaveActive,
    SaveActiveAs,

    OpenFolderRequested,
    OpenFolder(PathBuf),
    CloseFolder,
    ToggleDirectory(PathBuf),

    NewSession {
        shell: Option<ShellKind>,
        working_directory: Option<PathBuf>,
    },
    CloseSession(SessionId),
    FocusSession(SessionId),
    SubmitCommand {
        session: SessionId,
        text: String,
    },
    SetTerminalVisible(bool),

    FilePicked(HostResult<Option<PathBuf>>),
    FolderPicked(HostResult<Option<PathBuf>>),
    SavePathChosen {
        id: DocumentId,
        result: HostResult<Option<PathBuf>>,
    },
    FileLoaded {
        path: PathBuf,
        content: String,
    },
    FileLoadFailed {
        path: PathBuf,
        error: HostError,
    },
    FileSaved {
        id: DocumentId,
        path: PathBuf,
        version: u64,
    },
    FileSaveFailed {
        id: DocumentId,
        path: PathBuf,
        error: HostError,
    },
    RootListed {
        token: u64,
        path: PathBuf,
        entries: Vec<DirEntryInfo>,
    },
    RootListFailed {
        token: u64,
        path: PathBuf,
        error: HostError,
    },
    DirListed {
        generation: u64,
        path: PathBuf,
        entries: Vec<DirEntryInfo>,
    },
    DirListFailed {
        generation: u64,
        path: PathBuf,
        error: HostError,
    },
    SessionCreated {
        id: SessionId,
        shell: ShellKind,
        working_directory: PathBuf,
    },
    SessionCreateFailed {
        shell: ShellKind,
        error: HostError,
    },
    SessionTerminateFailed {
        id: SessionId,
        error: HostError,
    },
    CommandFinished {
        session: SessionId,
        result: HostResult<CommandOutput>,
    },
    WorkingDirectoryResolved {
        session: SessionId,
        result: HostResult<PathBuf>,
    },
}
