// cbm-common/src/model/record.rs
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::arch::{Architecture, Locale};
use super::version::VersionId;

/// One installed build. Identified by `(version, arch, locale)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub version: VersionId,
    pub arch: Architecture,
    #[serde(rename = "language")]
    pub locale: Locale,
    pub install_path: PathBuf,
    pub installed_at: NaiveDateTime,
}

impl InstallRecord {
    pub fn new(
        version: VersionId,
        arch: Architecture,
        locale: Locale,
        install_path: PathBuf,
    ) -> Self {
        Self {
            version,
            arch,
            locale,
            install_path,
            installed_at: chrono::Local::now().naive_local(),
        }
    }

    pub fn matches(&self, version: &VersionId, arch: Architecture, locale: &Locale) -> bool {
        &self.version == version && self.arch == arch && &self.locale == locale
    }

    pub fn same_identity(&self, other: &InstallRecord) -> bool {
        self.matches(&other.version, other.arch, &other.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_records_written_with_iso_timestamps() {
        let json = r#"{
            "version": "128.0b3-candidates",
            "arch": "win64",
            "language": "en-US",
            "install_path": "builds/128.0b3-candidates-win64-en-US",
            "installed_at": "2024-06-01T10:15:30.123456"
        }"#;
        let record: InstallRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.version.raw(), "128.0b3-candidates");
        assert_eq!(record.arch, Architecture::Win64);
        assert_eq!(record.locale.as_str(), "en-US");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["language"], "en-US");
        assert_eq!(back["installed_at"], "2024-06-01T10:15:30.123456");
    }

    #[test]
    fn identity_ignores_path_and_timestamp() {
        let locale = Locale::new("en-US").unwrap();
        let a = InstallRecord::new(
            VersionId::new("1.0"),
            Architecture::Mac,
            locale.clone(),
            PathBuf::from("/a"),
        );
        let mut b = a.clone();
        b.install_path = PathBuf::from("/b");
        assert!(a.same_identity(&b));
        assert!(!a.matches(&VersionId::new("1.0"), Architecture::Win32, &locale));
    }
}
