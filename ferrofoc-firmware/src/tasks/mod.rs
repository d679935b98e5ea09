//! Embassy tasks
//!
//! The supervisor runs on the interrupt executor, diagnostics in thread
//! mode.

pub mod diagnostics;
pub mod supervisor;

pub use diagnostics::diagnostics_task;
pub use supervisor::supervisor_task;
