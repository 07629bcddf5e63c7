// cbm-common/src/model/mod.rs
pub mod arch;
pub mod format;
pub mod record;
pub mod version;

pub use arch::{Architecture, Locale};
pub use format::ArchiveFormat;
pub use record::InstallRecord;
pub use version::{BuildNumber, VersionId, BUILD_FOLDER_PREFIX, CANDIDATES_SUFFIX};
