//! Composition root: wires the kernel store to the host runtime.

mod workbench;

pub use workbench::Workbench;
