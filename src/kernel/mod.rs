//! Headless session core (state/action/effect).

pub mod action;
pub mod collection;
pub mod documents;
pub mod effect;
pub mod explorer;
pub mod language;
pub mod services;
pub mod state;
pub mod store;
pub mod terminal;

pub use action::Action;
pub use collection::{ActiveList, Keyed};
pub use documents::{DocumentId, DocumentPatch, DocumentRegistry, OpenDocument};
pub use effect::Effect;
pub use explorer::{DirectoryNode, DirectoryTree, ListingRequest, RootRequest, TreeRow};
pub use language::LanguageId;
pub use state::{AppState, Notification, NotificationLevel};
pub use store::{DispatchResult, Store};
pub use terminal::{
    CommandSession, Completion, OutputEntry, OutputKind, RunRequest, SessionMultiplexer,
    SessionPhase,
};
