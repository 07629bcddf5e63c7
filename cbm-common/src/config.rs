// cbm-common/src/config.rs
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{CbmError, Result};
use crate::model::{Architecture, Locale, VersionId};

pub const DEFAULT_BASE_URL: &str = "https://archive.mozilla.org/pub/firefox/candidates/";
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UPDATE_MARKER: &str = "cbm-pinned";
const INVENTORY_FILENAME: &str = "builds.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub base_url: String,
    pub probe_timeout: Duration,
    /// Patch the update channel of freshly installed builds.
    pub disable_updates: bool,
    pub update_marker: String,
    pub keep_downloads: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading cbm configuration");
        Self::load_with(|key| env::var(key).ok())
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let root = match var("CBM_ROOT") {
            Some(root) => PathBuf::from(root),
            None => ProjectDirs::from("org", "cbm", "cbm")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| {
                    CbmError::Config(
                        "Could not determine a data directory; set CBM_ROOT".to_string(),
                    )
                })?,
        };
        debug!("Effective CBM_ROOT set to: {}", root.display());

        let mut config = Self::with_root(root);

        if let Some(base_url) = var("CBM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(secs) = var("CBM_PROBE_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                CbmError::Config(format!("Invalid CBM_PROBE_TIMEOUT_SECS '{secs}': {e}"))
            })?;
            config.probe_timeout = Duration::from_secs(secs);
        }
        config.disable_updates = var("CBM_DISABLE_UPDATES").is_some_and(|v| v == "1");
        if let Some(marker) = var("CBM_UPDATE_MARKER") {
            config.update_marker = marker;
        }
        config.keep_downloads = var("CBM_KEEP_DOWNLOADS").is_some_and(|v| v == "1");

        debug!("Configuration loaded successfully.");
        Ok(config)
    }

    /// Configuration rooted at an explicit directory with default settings.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            disable_updates: false,
            update_marker: DEFAULT_UPDATE_MARKER.to_string(),
            keep_downloads: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn install_root(&self) -> PathBuf {
        self.root.join("builds")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join("downloads")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.root.join(INVENTORY_FILENAME)
    }

    /// Install folder of a build. Depends only on the identifying triple.
    pub fn install_path(&self, version: &VersionId, arch: Architecture, locale: &Locale) -> PathBuf {
        self.install_root()
            .join(format!("{}-{}-{}", version.raw(), arch.as_str(), locale.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_overrides_from_environment() {
        let config = Config::load_with(lookup(&[
            ("CBM_ROOT", "/srv/cbm"),
            ("CBM_BASE_URL", "https://mirror.example/candidates/"),
            ("CBM_PROBE_TIMEOUT_SECS", "3"),
            ("CBM_DISABLE_UPDATES", "1"),
            ("CBM_UPDATE_MARKER", "frozen"),
        ]))
        .unwrap();
        assert_eq!(config.root(), Path::new("/srv/cbm"));
        assert_eq!(config.base_url, "https://mirror.example/candidates/");
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert!(config.disable_updates);
        assert_eq!(config.update_marker, "frozen");
        assert!(!config.keep_downloads);
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = Config::load_with(lookup(&[
            ("CBM_ROOT", "/srv/cbm"),
            ("CBM_PROBE_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, CbmError::Config(_)));
    }

    #[test]
    fn install_path_is_derived_from_identity() {
        let config = Config::with_root("/data");
        let path = config.install_path(
            &VersionId::new("128.0b3-candidates"),
            Architecture::LinuxX86_64,
            &Locale::new("en-US").unwrap(),
        );
        assert_eq!(
            path,
            PathBuf::from("/data/builds/128.0b3-candidates-linux-x86_64-en-US")
        );
    }
}
