// cbm-core/src/install/prefs.rs
//! Optional post-install patch of the update channel preference.
//!
//! Appending a marker to the channel name makes the update service URL point
//! at a channel that does not exist, which in practice stops the installed
//! build from updating itself. Nothing verifies that the application honours
//! the changed value.
use std::fs;
use std::path::Path;

use cbm_common::error::{CbmError, Result};
use cbm_common::model::Architecture;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static CHANNEL_PREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(pref\(\s*"app\.update\.channel"\s*,\s*")([^"]*)("\s*\))"#)
        .expect("channel pref pattern is valid")
});

/// Rewrites `pref("app.update.channel", "<c>")` to `"<c>-<marker>"`.
///
/// Returns `Ok(false)` if the channel already carries the marker.
pub fn disable_update_channel(install_path: &Path, arch: Architecture, marker: &str) -> Result<bool> {
    let prefs_path = install_path.join(arch.channel_prefs_relpath());
    if !prefs_path.is_file() {
        return Err(CbmError::NotFound(format!(
            "update channel preferences at {}",
            prefs_path.display()
        )));
    }

    let contents = fs::read_to_string(&prefs_path)?;
    let Some(caps) = CHANNEL_PREF_RE.captures(&contents) else {
        return Err(CbmError::InstallError(format!(
            "No app.update.channel preference in {}",
            prefs_path.display()
        )));
    };

    let channel = &caps[2];
    let suffix = format!("-{marker}");
    if channel.ends_with(&suffix) {
        debug!("Update channel in {} already patched", prefs_path.display());
        return Ok(false);
    }

    let patched_channel = format!("{channel}{suffix}");
    let patched = CHANNEL_PREF_RE.replace(&contents, |c: &regex::Captures<'_>| {
        format!("{}{}{}", &c[1], patched_channel, &c[3])
    });
    fs::write(&prefs_path, patched.as_bytes())?;
    debug!(
        "Update channel in {} changed from '{}' to '{}'",
        prefs_path.display(),
        channel,
        patched_channel
    );
    Ok(true)
}
