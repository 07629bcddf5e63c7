// cbm-common/src/model/format.rs
use std::fmt;
use std::path::Path;

use crate::error::{CbmError, Result};

/// Archive layouts the installer knows how to unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarBz2,
    TarXz,
    DiskImage,
}

impl ArchiveFormat {
    const SUFFIXES: [(&'static str, ArchiveFormat); 4] = [
        (".zip", ArchiveFormat::Zip),
        (".tar.bz2", ArchiveFormat::TarBz2),
        (".tar.xz", ArchiveFormat::TarXz),
        (".dmg", ArchiveFormat::DiskImage),
    ];

    /// Selects the format from the file name suffix (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Self::SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, format)| *format)
            .ok_or_else(|| CbmError::UnsupportedFormat(path.display().to_string()))
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::TarBz2 => ".tar.bz2",
            ArchiveFormat::TarXz => ".tar.xz",
            ArchiveFormat::DiskImage => ".dmg",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats_by_suffix() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("/tmp/firefox-1.0.zip")).unwrap(),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("firefox-1.0.tar.bz2")).unwrap(),
            ArchiveFormat::TarBz2
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("firefox-1.0.tar.xz")).unwrap(),
            ArchiveFormat::TarXz
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("Firefox 1.0.DMG")).unwrap(),
            ArchiveFormat::DiskImage
        );
    }

    #[test]
    fn unknown_suffix_is_unsupported() {
        let err = ArchiveFormat::from_path(Path::new("firefox-1.0.tar.gz")).unwrap_err();
        assert!(matches!(err, CbmError::UnsupportedFormat(_)));
    }
}
