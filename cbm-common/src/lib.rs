// cbm-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;

// Re-export key types
pub use config::Config;
pub use error::{CbmError, ErrorKind, Result};
pub use model::{Architecture, ArchiveFormat, BuildNumber, InstallRecord, Locale, VersionId};
