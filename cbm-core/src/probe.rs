// cbm-core/src/probe.rs
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;

static VERSION_OUTPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Firefox\s+(\d+(?:\.\d+)+(?:[ab]\d+)?(?:esr)?)\b")
        .expect("version output pattern is valid")
});

/// Asks an installed executable which version it is.
///
/// `None` means the version could not be determined, for whatever reason.
#[allow(async_fn_in_trait)]
pub trait VersionProbe {
    async fn probe(&self, executable: &Path) -> Option<String>;
}

/// Runs `<executable> --version` and parses its standard output.
#[derive(Debug, Clone)]
pub struct ProcessVersionProbe {
    timeout: Duration,
}

impl ProcessVersionProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl VersionProbe for ProcessVersionProbe {
    async fn probe(&self, executable: &Path) -> Option<String> {
        if !executable.is_file() {
            debug!("No executable at {}", executable.display());
            return None;
        }

        let mut cmd = Command::new(executable);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("Failed to run {} --version: {}", executable.display(), e);
                return None;
            }
            Err(_) => {
                debug!(
                    "{} --version did not finish within {:?}",
                    executable.display(),
                    self.timeout
                );
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "{} --version exited with {}",
                executable.display(),
                output.status
            );
            return None;
        }
        let version = parse_version_output(&String::from_utf8_lossy(&output.stdout));
        if version.is_none() {
            debug!(
                "Unrecognised version output from {}: {}",
                executable.display(),
                String::from_utf8_lossy(&output.stdout).trim()
            );
        }
        version
    }
}

/// Extracts the version token from `Mozilla Firefox 128.0b3` style output.
pub fn parse_version_output(stdout: &str) -> Option<String> {
    VERSION_OUTPUT_RE
        .captures(stdout)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_beta_and_esr_output() {
        assert_eq!(
            parse_version_output("Mozilla Firefox 100.0.1\n").as_deref(),
            Some("100.0.1")
        );
        assert_eq!(
            parse_version_output("Mozilla Firefox 128.0b3").as_deref(),
            Some("128.0b3")
        );
        assert_eq!(
            parse_version_output("Mozilla Firefox 115.12.0esr\n").as_deref(),
            Some("115.12.0esr")
        );
    }

    #[test]
    fn unrecognised_output_yields_none() {
        assert_eq!(parse_version_output(""), None);
        assert_eq!(parse_version_output("Segmentation fault"), None);
        assert_eq!(parse_version_output("Mozilla Firefox nightly"), None);
    }

    #[tokio::test]
    async fn missing_executable_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let probe = ProcessVersionProbe::new(Duration::from_secs(1));
        assert_eq!(probe.probe(&dir.path().join("firefox")).await, None);
    }

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("firefox");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_the_executable_with_version_flag() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(
            dir.path(),
            r#"[ "$1" = "--version" ] && echo "Mozilla Firefox 100.0.1""#,
        );
        let probe = ProcessVersionProbe::new(Duration::from_secs(5));
        assert_eq!(probe.probe(&exe).await.as_deref(), Some("100.0.1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_executable_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(dir.path(), "sleep 5; echo \"Mozilla Firefox 1.0\"");
        let probe = ProcessVersionProbe::new(Duration::from_millis(200));
        assert_eq!(probe.probe(&exe).await, None);
    }
}
