// cbm-core/src/resolve.rs
use cbm_common::error::{CbmError, Result};
use cbm_common::model::{BuildNumber, VersionId, CANDIDATES_SUFFIX};
use cbm_net::{as_directory_url, validate_url, DirectoryIndex};
use tracing::debug;
use url::Url;

/// Turns a version identifier into the newest numbered build folder.
#[derive(Debug, Clone)]
pub struct BuildResolver<I> {
    index: I,
    base_url: Url,
}

impl<I: DirectoryIndex> BuildResolver<I> {
    pub fn new(index: I, base_url: &str) -> Result<Self> {
        let base_url = as_directory_url(&validate_url(base_url)?);
        Ok(Self { index, base_url })
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Remote directory holding the builds of `version`.
    pub fn version_url(&self, version: &VersionId) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CbmError::ValidationError(format!("Base URL {} cannot hold paths", self.base_url))
            })?
            .pop_if_empty()
            .push(version.raw())
            .push("");
        Ok(url)
    }

    /// Picks the `build<N>` folder with the largest `N` under the version
    /// directory. Entries that are not directories or do not parse are skipped.
    pub async fn resolve_latest_build(&self, version: &VersionId) -> Result<BuildNumber> {
        let url = self.version_url(version)?;
        let entries = self.index.list(&url).await?;
        let latest = entries
            .iter()
            .filter(|entry| entry.is_dir)
            .filter_map(|entry| BuildNumber::from_folder_name(&entry.name))
            .max();
        match latest {
            Some(build) => {
                debug!("Latest build for {} is {}", version, build);
                Ok(build)
            }
            None => Err(CbmError::NoBuildsPresent(url.to_string())),
        }
    }

    /// Candidate versions published under the base URL, newest first.
    pub async fn list_versions(&self) -> Result<Vec<VersionId>> {
        let entries = self.index.list(&self.base_url).await?;
        let mut versions: Vec<VersionId> = entries
            .into_iter()
            .filter(|entry| entry.is_dir && entry.name.ends_with(CANDIDATES_SUFFIX))
            .map(|entry| VersionId::new(entry.name))
            .collect();
        versions.sort_by(|a, b| b.natural_cmp(a));
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cbm_net::DirEntry;

    use super::*;

    const BASE: &str = "https://archive.example/pub/firefox/candidates/";

    /// In-memory listing keyed by directory URL.
    struct StaticIndex(HashMap<String, Vec<DirEntry>>);

    impl StaticIndex {
        fn with(url: &str, entries: Vec<DirEntry>) -> Self {
            Self(HashMap::from([(url.to_string(), entries)]))
        }
    }

    impl DirectoryIndex for StaticIndex {
        async fn list(&self, url: &Url) -> Result<Vec<DirEntry>> {
            self.0
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| CbmError::NotFound(url.to_string()))
        }
    }

    fn version_dir(version: &str) -> String {
        format!("{BASE}{version}/")
    }

    #[tokio::test]
    async fn picks_numeric_maximum_not_lexicographic() {
        let index = StaticIndex::with(
            &version_dir("100.0-candidates"),
            vec![DirEntry::dir("build2"), DirEntry::dir("build10")],
        );
        let resolver = BuildResolver::new(index, BASE).unwrap();
        let build = resolver
            .resolve_latest_build(&VersionId::new("100.0-candidates"))
            .await
            .unwrap();
        assert_eq!(build.folder_name(), "build10");
    }

    #[tokio::test]
    async fn skips_malformed_and_non_directory_entries() {
        let index = StaticIndex::with(
            &version_dir("100.0-candidates"),
            vec![
                DirEntry::dir("build3"),
                DirEntry::dir("buildx"),
                DirEntry::dir("build"),
                DirEntry::file("build99"),
                DirEntry::dir("logs"),
                DirEntry::dir("build4"),
            ],
        );
        let resolver = BuildResolver::new(index, BASE).unwrap();
        let build = resolver
            .resolve_latest_build(&VersionId::new("100.0-candidates"))
            .await
            .unwrap();
        assert_eq!(build, BuildNumber::new(4));
    }

    #[tokio::test]
    async fn no_matching_entries_is_no_builds_present() {
        let index = StaticIndex::with(
            &version_dir("100.0-candidates"),
            vec![DirEntry::dir("logs"), DirEntry::file("SHA256SUMS")],
        );
        let resolver = BuildResolver::new(index, BASE).unwrap();
        let err = resolver
            .resolve_latest_build(&VersionId::new("100.0-candidates"))
            .await
            .unwrap_err();
        assert!(matches!(err, CbmError::NoBuildsPresent(_)));
    }

    #[tokio::test]
    async fn missing_version_directory_is_not_found() {
        let index = StaticIndex(HashMap::new());
        let resolver = BuildResolver::new(index, BASE).unwrap();
        let err = resolver
            .resolve_latest_build(&VersionId::new("1.0-candidates"))
            .await
            .unwrap_err();
        assert!(matches!(err, CbmError::NotFound(_)));
    }

    #[tokio::test]
    async fn lists_candidate_versions_newest_first() {
        let index = StaticIndex::with(
            BASE,
            vec![
                DirEntry::dir("99.0-candidates"),
                DirEntry::dir("100.0-candidates"),
                DirEntry::dir("100.0b9-candidates"),
                DirEntry::dir("nightly"),
                DirEntry::file("README-candidates"),
            ],
        );
        let resolver = BuildResolver::new(index, "https://archive.example/pub/firefox/candidates")
            .unwrap();
        let versions = resolver.list_versions().await.unwrap();
        let raw: Vec<&str> = versions.iter().map(|v| v.raw()).collect();
        assert_eq!(
            raw,
            vec!["100.0b9-candidates", "100.0-candidates", "99.0-candidates"]
        );
    }
}
