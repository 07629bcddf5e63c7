// cbm-core/src/manager.rs
//! Request/response entry points used by front ends.
use std::fs;
use std::path::{Path, PathBuf};

use cbm_common::config::Config;
use cbm_common::error::{CbmError, Result};
use cbm_common::model::{Architecture, InstallRecord, Locale, VersionId};
use cbm_net::{DirectoryIndex, Fetcher, HttpDirectoryIndex};
use tracing::{debug, info, warn};

use crate::install;
use crate::inventory::{self, Inventory};
use crate::launch;
use crate::locate::ArtifactLocator;
use crate::resolve::BuildResolver;

/// A validated install request. Parsing rejects bad input before any
/// network or filesystem activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub version: VersionId,
    pub arch: Architecture,
    pub locale: Locale,
}

impl InstallRequest {
    pub fn parse(version: &str, arch: &str, locale: &str) -> Result<Self> {
        if version.trim().trim_end_matches('/').is_empty() {
            return Err(CbmError::ValidationError(
                "A version is required, e.g. 128.0b3".to_string(),
            ));
        }
        Ok(Self {
            arch: arch.parse()?,
            locale: locale.parse()?,
            version: VersionId::candidate(version),
        })
    }
}

/// An inventory record together with whether its folder still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub record: InstallRecord,
    pub present: bool,
}

pub struct BuildManager<I> {
    config: Config,
    resolver: BuildResolver<I>,
    locator: ArtifactLocator,
    fetcher: Fetcher,
    inventory: Inventory,
}

impl BuildManager<HttpDirectoryIndex> {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config, HttpDirectoryIndex::new()?, Fetcher::new()?)
    }
}

impl<I: DirectoryIndex> BuildManager<I> {
    pub fn new(config: &Config, index: I, fetcher: Fetcher) -> Result<Self> {
        Ok(Self {
            resolver: BuildResolver::new(index, &config.base_url)?,
            locator: ArtifactLocator::new(&config.base_url)?,
            inventory: Inventory::new(config.inventory_path()),
            config: config.clone(),
            fetcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn available_versions(&self) -> Result<Vec<VersionId>> {
        self.resolver.list_versions().await
    }

    /// Downloads the newest build of the requested version and installs it.
    ///
    /// The inventory is written only after the install folder is complete.
    pub async fn resolve_and_install(
        &self,
        request: &InstallRequest,
        on_progress: Option<&mut (dyn FnMut(f64) + Send)>,
    ) -> Result<InstallRecord> {
        let InstallRequest {
            version,
            arch,
            locale,
        } = request;

        let build = self.resolver.resolve_latest_build(version).await?;
        let artifact = self.locator.locate(version, build, *arch, locale)?;
        info!("Installing {} {} ({}, {})", version, build, arch, locale);

        let archive_path = self.config.downloads_dir().join(&artifact.filename);
        self.fetcher
            .fetch(&artifact.url, &archive_path, on_progress)
            .await?;

        let target_dir = self.config.install_path(version, *arch, locale);
        let install_path = {
            let archive_path = archive_path.clone();
            let target_dir = target_dir.clone();
            tokio::task::spawn_blocking(move || install_into(&archive_path, &target_dir))
                .await
                .map_err(|e| CbmError::InstallError(format!("Install task failed: {e}")))??
        };

        if self.config.disable_updates {
            match install::disable_update_channel(&install_path, *arch, &self.config.update_marker) {
                Ok(true) => info!("Disabled updates for {}", install_path.display()),
                Ok(false) => debug!("Updates already disabled for {}", install_path.display()),
                Err(e) => warn!(
                    "Could not disable updates for {}: {}",
                    install_path.display(),
                    e
                ),
            }
        }

        if !self.config.keep_downloads {
            if let Err(e) = fs::remove_file(&archive_path) {
                warn!("Failed to remove {}: {}", archive_path.display(), e);
            }
        }

        let record = InstallRecord::new(version.clone(), *arch, locale.clone(), install_path);
        let records = inventory::upsert(self.inventory.load()?, record.clone());
        self.inventory.save(&records)?;
        info!("Installed {} into {}", version, record.install_path.display());
        Ok(record)
    }

    pub fn list_inventory(&self) -> Result<Vec<InventoryEntry>> {
        Ok(self
            .inventory
            .load()?
            .into_iter()
            .map(|record| InventoryEntry {
                present: self
                    .config
                    .install_path(&record.version, record.arch, &record.locale)
                    .is_dir(),
                record,
            })
            .collect())
    }

    pub fn find_record(
        &self,
        version: &VersionId,
        arch: Architecture,
        locale: &Locale,
    ) -> Result<Option<InstallRecord>> {
        Ok(self
            .inventory
            .load()?
            .into_iter()
            .find(|r| r.matches(version, arch, locale)))
    }

    /// Deletes the install folder and then the record. Returns `false` when
    /// no such record exists.
    pub fn remove_build(
        &self,
        version: &VersionId,
        arch: Architecture,
        locale: &Locale,
    ) -> Result<bool> {
        let records = self.inventory.load()?;
        if !records.iter().any(|r| r.matches(version, arch, locale)) {
            debug!("No record for {} ({}, {})", version, arch, locale);
            return Ok(false);
        }

        let folder = self.config.install_path(version, arch, locale);
        if folder.exists() {
            fs::remove_dir_all(&folder).map_err(|e| {
                CbmError::IoError(format!("Failed to delete {}: {}", folder.display(), e))
            })?;
            debug!("Deleted {}", folder.display());
        }

        self.inventory
            .save(&inventory::remove(records, version, arch, locale))?;
        info!("Removed {} ({}, {})", version, arch, locale);
        Ok(true)
    }

    pub fn launch(&self, record: &InstallRecord) -> Result<()> {
        launch::launch(&self.derived_path(record), record.arch)
    }

    pub fn open_folder(&self, record: &InstallRecord) -> Result<()> {
        launch::open_folder(&self.derived_path(record))
    }

    fn derived_path(&self, record: &InstallRecord) -> PathBuf {
        self.config
            .install_path(&record.version, record.arch, &record.locale)
    }
}

/// Replaces any previous install at `target_dir` with the archive contents.
///
/// The archive is installed into a sibling staging directory first; the
/// previous install is only removed once that has succeeded.
fn install_into(archive_path: &Path, target_dir: &Path) -> Result<PathBuf> {
    let parent = target_dir.parent().ok_or_else(|| {
        CbmError::InstallError(format!(
            "Cannot get parent directory for {}",
            target_dir.display()
        ))
    })?;
    fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".cbm-staging-")
        .tempdir_in(parent)?;
    install::install(archive_path, staging.path())?;

    if target_dir.symlink_metadata().is_ok() {
        debug!("Removing previous install at {}", target_dir.display());
        fs::remove_dir_all(target_dir)?;
    }
    fs::rename(staging.path(), target_dir)?;
    Ok(target_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use cbm_common::error::ErrorKind;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_zip(path: &Path, content: &[u8]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        writer
            .start_file("firefox/firefox.exe", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn failed_reinstall_keeps_previous_install() {
        let dir = tempfile::tempdir().unwrap();
        let builds = dir.path().join("builds");
        let target = builds.join("1.0-win64-en-US");

        let good = dir.path().join("firefox-1.0.zip");
        write_zip(&good, b"MZ");
        install_into(&good, &target).unwrap();

        let corrupt = dir.path().join("firefox-1.0-broken.zip");
        fs::write(&corrupt, b"definitely not a zip").unwrap();
        assert!(install_into(&corrupt, &target).is_err());

        assert_eq!(fs::read(target.join("firefox/firefox.exe")).unwrap(), b"MZ");
        let entries: Vec<_> = fs::read_dir(&builds)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("1.0-win64-en-US")]);
    }

    #[test]
    fn reinstall_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("builds").join("1.0-win64-en-US");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale.txt"), b"old").unwrap();

        let archive = dir.path().join("firefox-1.0.zip");
        write_zip(&archive, b"MZ2");
        assert_eq!(install_into(&archive, &target).unwrap(), target);

        assert!(!target.join("stale.txt").exists());
        assert_eq!(fs::read(target.join("firefox/firefox.exe")).unwrap(), b"MZ2");
    }

    #[test]
    fn parse_normalises_version_and_validates_fields() {
        let request = InstallRequest::parse("128.0b3", "win64", "en-US").unwrap();
        assert_eq!(request.version.raw(), "128.0b3-candidates");
        assert_eq!(request.arch, Architecture::Win64);
        assert_eq!(request.locale.as_str(), "en-US");

        let err = InstallRequest::parse("128.0b3", "arm64", "en-US").unwrap_err();
        assert!(matches!(err, CbmError::UnsupportedArchitecture(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);

        assert!(matches!(
            InstallRequest::parse("  ", "mac", "en-US"),
            Err(CbmError::ValidationError(_))
        ));
    }
}
