// cbm-core/src/launch.rs
use std::path::Path;
use std::process::{Command, Stdio};

use cbm_common::error::{CbmError, Result};
use cbm_common::model::Architecture;
use tracing::debug;

/// Starts the installed executable without waiting for it.
pub fn launch(install_path: &Path, arch: Architecture) -> Result<()> {
    let executable = install_path.join(arch.executable_relpath());
    if !executable.is_file() {
        return Err(CbmError::NotFound(format!(
            "executable {}",
            executable.display()
        )));
    }
    debug!("Launching {}", executable.display());
    Command::new(&executable)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            CbmError::CommandExecError(format!("Failed to start {}: {}", executable.display(), e))
        })?;
    Ok(())
}

/// Opens a folder in the platform file manager.
pub fn open_folder(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(CbmError::NotFound(format!("folder {}", path.display())));
    }
    let opener = folder_opener();
    debug!("Executing: {} {}", opener, path.display());
    Command::new(opener)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CbmError::CommandExecError(format!("{opener}: {e}")))?;
    Ok(())
}

fn folder_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}
