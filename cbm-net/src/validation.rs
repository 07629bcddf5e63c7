// cbm-net/src/validation.rs
use cbm_common::error::{CbmError, Result};
use url::Url;

/// Parses a URL, accepting only the `http` and `https` schemes.
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).map_err(|e| {
        CbmError::ValidationError(format!("Failed to parse URL '{url_str}': {e}"))
    })?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        other => Err(CbmError::ValidationError(format!(
            "Invalid URL scheme for '{url_str}': must be http(s), but got '{other}'"
        ))),
    }
}

/// Returns a copy of `url` whose path ends in `/`, so relative joins resolve
/// inside it rather than beside it.
pub fn as_directory_url(url: &Url) -> Url {
    let mut dir = url.clone();
    if !dir.path().ends_with('/') {
        let path = format!("{}/", dir.path());
        dir.set_path(&path);
    }
    dir
}
