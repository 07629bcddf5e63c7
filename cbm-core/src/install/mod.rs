// cbm-core/src/install/mod.rs
use std::path::{Path, PathBuf};

use cbm_common::error::Result;
use cbm_common::model::ArchiveFormat;
use tracing::debug;

pub mod dmg;
pub mod extract;
pub mod prefs;

pub use dmg::DETACH_SETTLE_DELAY;
pub use prefs::disable_update_channel;

/// Installs a downloaded artifact into `target_dir`, choosing the strategy
/// from the file name suffix.
pub fn install(archive_path: &Path, target_dir: &Path) -> Result<PathBuf> {
    let format = ArchiveFormat::from_path(archive_path)?;
    debug!(
        "Installing {} ({}) into {}",
        archive_path.display(),
        format,
        target_dir.display()
    );
    match format {
        ArchiveFormat::Zip | ArchiveFormat::TarBz2 | ArchiveFormat::TarXz => {
            extract::extract_archive(archive_path, target_dir, format)?;
            Ok(target_dir.to_path_buf())
        }
        ArchiveFormat::DiskImage => dmg::install_disk_image(archive_path, target_dir),
    }
}

#[cfg(test)]
mod tests {
    use cbm_common::error::CbmError;

    use super::*;

    #[test]
    fn unknown_suffix_is_rejected_before_touching_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("firefox-1.0.exe");
        std::fs::write(&archive, b"MZ").unwrap();
        let target = dir.path().join("out");

        let err = install(&archive, &target).unwrap_err();
        assert!(matches!(err, CbmError::UnsupportedFormat(_)));
        assert!(!target.exists());
    }
}
