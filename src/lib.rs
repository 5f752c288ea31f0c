//! deskcore: headless session core of a code-editor shell.
//!
//! Module layout:
//! - kernel: stores (documents, explorer tree, terminal sessions), actions,
//!   effects and the host runtime contract
//! - kernel::services::adapters: local filesystem/process host, settings,
//!   tokio executor
//! - app: `Workbench`, which owns the store and drives host replies

pub mod app;
pub mod kernel;
