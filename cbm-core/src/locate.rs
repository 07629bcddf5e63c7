// cbm-core/src/locate.rs
use cbm_common::error::{CbmError, Result};
use cbm_common::model::{Architecture, BuildNumber, Locale, VersionId};
use cbm_net::{as_directory_url, validate_url};
use url::Url;

/// A concrete downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: String,
    pub filename: String,
}

/// Maps `(version, build, arch, locale)` onto the remote artifact layout
/// `<base>/<raw-version>/<build>/<arch>/<locale>/<filename>`.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    base_url: Url,
}

impl ArtifactLocator {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: as_directory_url(&validate_url(base_url)?),
        })
    }

    pub fn locate(
        &self,
        version: &VersionId,
        build: BuildNumber,
        arch: Architecture,
        locale: &Locale,
    ) -> Result<Artifact> {
        // The remote directory keeps the raw identifier, published filenames never do.
        let filename = arch.artifact_filename(version.clean());
        let build_folder = build.folder_name();

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CbmError::ValidationError(format!("Base URL {} cannot hold paths", self.base_url))
            })?
            .pop_if_empty()
            .extend([
                version.raw(),
                build_folder.as_str(),
                arch.as_str(),
                locale.as_str(),
                filename.as_str(),
            ]);

        Ok(Artifact {
            url: url.to_string(),
            filename,
        })
    }
}
