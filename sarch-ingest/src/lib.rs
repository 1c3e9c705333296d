//! sarch-ingest library interface
//!
//! The `addlocal` importer and its supporting pieces, exposed for
//! integration testing.

pub mod console;
pub mod error;
pub mod importer;
pub mod session_info;

pub use crate::console::Console;
pub use crate::error::{ImportError, ImportResult};
pub use crate::importer::{ImportStats, Importer};
