// cbm-net/src/index.rs
//! Directory listings of the remote candidates tree.
use cbm_common::error::{CbmError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::http::build_http_client;
use crate::validation::as_directory_url;

static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("href pattern is valid")
});

/// One child of a remote directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntry {
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

/// Lists the children of a remote directory URL.
#[allow(async_fn_in_trait)]
pub trait DirectoryIndex {
    async fn list(&self, url: &Url) -> Result<Vec<DirEntry>>;
}

/// [`DirectoryIndex`] backed by HTML index pages served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDirectoryIndex {
    client: Client,
}

impl HttpDirectoryIndex {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl DirectoryIndex for HttpDirectoryIndex {
    async fn list(&self, url: &Url) -> Result<Vec<DirEntry>> {
        let dir_url = as_directory_url(url);
        debug!("Listing remote directory {}", dir_url);
        let response = self.client.get(dir_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("Listing {} returned HTTP {}", dir_url, status);
            return Err(CbmError::NotFound(format!(
                "{dir_url} (HTTP {})",
                status.as_u16()
            )));
        }
        let body = response.text().await?;
        let entries = parse_listing(&dir_url, &body);
        debug!("Found {} entries under {}", entries.len(), dir_url);
        Ok(entries)
    }
}

/// Extracts the direct children of `base` from an HTML index page.
///
/// Links may be relative or absolute; anything that does not resolve to an
/// immediate child of `base` (parent links, sort links, other hosts) is
/// ignored. A trailing `/` marks a directory.
pub fn parse_listing(base: &Url, html: &str) -> Vec<DirEntry> {
    let base = as_directory_url(base);
    let mut entries: Vec<DirEntry> = Vec::new();
    for caps in HREF_RE.captures_iter(html) {
        let href = &caps[1];
        if href.starts_with('?') || href.starts_with('#') {
            continue;
        }
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if resolved.host_str() != base.host_str() || resolved.port() != base.port() {
            continue;
        }
        let Some(rest) = resolved.path().strip_prefix(base.path()) else {
            continue;
        };
        let is_dir = rest.ends_with('/');
        let name = rest.trim_end_matches('/');
        if name.is_empty() || name.contains('/') {
            continue;
        }
        if entries.iter().any(|e| e.name == name) {
            continue;
        }
        entries.push(DirEntry {
            name: name.to_string(),
            is_dir,
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><head><title>Directory Listing: /pub/firefox/candidates/141.0b3-candidates/</title></head>
<body>
<table>
<tr><td><a href="/pub/firefox/candidates/">..</a></td></tr>
<tr><td><a href="/pub/firefox/candidates/141.0b3-candidates/build1/">build1/</a></td></tr>
<tr><td><a href="/pub/firefox/candidates/141.0b3-candidates/build2/">build2/</a></td></tr>
<tr><td><a href='build10/'>build10/</a></td></tr>
<tr><td><a href="?C=M;O=A">Last modified</a></td></tr>
<tr><td><a href="SHA256SUMS">SHA256SUMS</a></td></tr>
<tr><td><a href="https://elsewhere.example/build99/">mirror</a></td></tr>
</table>
</body></html>
"#;

    #[test]
    fn extracts_children_from_absolute_and_relative_links() {
        let base =
            Url::parse("https://archive.example/pub/firefox/candidates/141.0b3-candidates")
                .unwrap();
        let entries = parse_listing(&base, LISTING);
        assert_eq!(
            entries,
            vec![
                DirEntry::dir("build1"),
                DirEntry::dir("build2"),
                DirEntry::dir("build10"),
                DirEntry::file("SHA256SUMS"),
            ]
        );
    }

    #[test]
    fn empty_page_has_no_entries() {
        let base = Url::parse("https://archive.example/pub/").unwrap();
        assert!(parse_listing(&base, "<html></html>").is_empty());
    }
}
