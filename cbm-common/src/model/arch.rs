// cbm-common/src/model/arch.rs
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CbmError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "win64")]
    Win64,
    #[serde(rename = "win32")]
    Win32,
    #[serde(rename = "mac")]
    Mac,
    #[serde(rename = "linux-x86_64")]
    LinuxX86_64,
}

impl Architecture {
    pub const ALL: [Architecture; 4] = [
        Architecture::Win64,
        Architecture::Win32,
        Architecture::Mac,
        Architecture::LinuxX86_64,
    ];

    /// Path segment used in the remote tree and in install folder names.
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Win64 => "win64",
            Architecture::Win32 => "win32",
            Architecture::Mac => "mac",
            Architecture::LinuxX86_64 => "linux-x86_64",
        }
    }

    pub fn is_windows(self) -> bool {
        matches!(self, Architecture::Win64 | Architecture::Win32)
    }

    /// Published artifact filename for a cleaned version string.
    pub fn artifact_filename(self, clean_version: &str) -> String {
        match self {
            Architecture::Win64 | Architecture::Win32 => format!("firefox-{clean_version}.zip"),
            Architecture::Mac => format!("Firefox {clean_version}.dmg"),
            Architecture::LinuxX86_64 => format!("firefox-{clean_version}.tar.bz2"),
        }
    }

    /// Executable location relative to an install folder.
    pub fn executable_relpath(self) -> PathBuf {
        match self {
            Architecture::Win64 | Architecture::Win32 => ["firefox", "firefox.exe"].iter().collect(),
            Architecture::Mac => ["Firefox.app", "Contents", "MacOS", "firefox"].iter().collect(),
            Architecture::LinuxX86_64 => ["firefox", "firefox"].iter().collect(),
        }
    }

    /// Update-channel preference file relative to an install folder.
    pub fn channel_prefs_relpath(self) -> PathBuf {
        match self {
            Architecture::Win64 | Architecture::Win32 | Architecture::LinuxX86_64 => {
                ["firefox", "defaults", "pref", "channel-prefs.js"].iter().collect()
            }
            Architecture::Mac => [
                "Firefox.app",
                "Contents",
                "Resources",
                "defaults",
                "pref",
                "channel-prefs.js",
            ]
            .iter()
            .collect(),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = CbmError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Architecture::ALL
            .into_iter()
            .find(|arch| arch.as_str() == wanted)
            .ok_or_else(|| CbmError::UnsupportedArchitecture(wanted.to_string()))
    }
}

/// Language-region code such as `en-US`. Only required to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(CbmError::ValidationError(
                "locale must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = CbmError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_architecture() {
        for arch in Architecture::ALL {
            assert_eq!(arch.as_str().parse::<Architecture>().unwrap(), arch);
        }
    }

    #[test]
    fn rejects_unknown_architecture() {
        let err = "arm64".parse::<Architecture>().unwrap_err();
        assert!(matches!(err, CbmError::UnsupportedArchitecture(ref a) if a == "arm64"));
    }

    #[test]
    fn filenames_follow_per_architecture_templates() {
        assert_eq!(Architecture::Win64.artifact_filename("128.0b3"), "firefox-128.0b3.zip");
        assert_eq!(Architecture::Win32.artifact_filename("128.0b3"), "firefox-128.0b3.zip");
        assert_eq!(Architecture::Mac.artifact_filename("128.0b3"), "Firefox 128.0b3.dmg");
        assert_eq!(
            Architecture::LinuxX86_64.artifact_filename("128.0b3"),
            "firefox-128.0b3.tar.bz2"
        );
    }

    #[test]
    fn serializes_as_path_segment() {
        let json = serde_json::to_string(&Architecture::LinuxX86_64).unwrap();
        assert_eq!(json, "\"linux-x86_64\"");
    }

    #[test]
    fn locale_must_not_be_empty() {
        assert!(Locale::new("  ").is_err());
        assert_eq!(Locale::new(" de ").unwrap().as_str(), "de");
    }
}
