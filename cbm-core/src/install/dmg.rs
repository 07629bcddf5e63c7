// cbm-core/src/install/dmg.rs
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use cbm_common::error::{CbmError, Result};
use tracing::{debug, error, warn};

/// Pause before detaching. Detaching right after the copy can fail while
/// the copy's file handles are still being released by the system.
pub const DETACH_SETTLE_DELAY: Duration = Duration::from_secs(2);

const APP_BUNDLE_SUFFIX: &str = ".app";

/// Copies the application bundle out of a disk image into `target_dir`.
pub fn install_disk_image(image_path: &Path, target_dir: &Path) -> Result<PathBuf> {
    if !cfg!(target_os = "macos") {
        return Err(CbmError::PlatformUnsupported(format!(
            "disk images such as {} can only be installed on macOS",
            image_path.display()
        )));
    }

    let mount = MountedImage::attach(image_path)?;
    let bundle = find_app_bundle(mount.mount_point())?;
    let installed = copy_bundle(&bundle, target_dir)?;
    debug!("Installed {} from {}", installed.display(), image_path.display());
    Ok(target_dir.to_path_buf())
}

/// An attached disk image. Dropping it detaches the image.
struct MountedImage {
    mount_point: PathBuf,
}

impl MountedImage {
    fn attach(image_path: &Path) -> Result<Self> {
        debug!("Mounting DMG: {}", image_path.display());
        let output = Command::new("hdiutil")
            .arg("attach")
            .arg("-plist")
            .arg("-nobrowse")
            .arg("-readonly")
            .arg(image_path)
            .output()
            .map_err(|e| CbmError::CommandExecError(format!("hdiutil attach: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("hdiutil attach failed for {}: {}", image_path.display(), stderr);
            return Err(CbmError::CommandExecError(format!(
                "Failed to mount DMG '{}': {}",
                image_path.display(),
                stderr.trim()
            )));
        }

        let mount_point = parse_mount_point(&output.stdout)?;
        debug!("DMG mounted at: {}", mount_point.display());
        Ok(Self { mount_point })
    }

    fn mount_point(&self) -> &Path {
        &self.mount_point
    }
}

impl Drop for MountedImage {
    fn drop(&mut self) {
        thread::sleep(DETACH_SETTLE_DELAY);
        if let Err(e) = detach(&self.mount_point) {
            warn!(
                "Failed to detach disk image at {}: {}",
                self.mount_point.display(),
                e
            );
        }
    }
}

fn detach(mount_point: &Path) -> Result<()> {
    debug!("Executing: hdiutil detach -force {}", mount_point.display());
    let output = Command::new("hdiutil")
        .arg("detach")
        .arg("-force")
        .arg(mount_point)
        .output()?;
    if output.status.success() {
        return Ok(());
    }

    debug!(
        "hdiutil detach failed ({}): {}. Trying diskutil...",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let diskutil_output = Command::new("diskutil")
        .arg("unmount")
        .arg("force")
        .arg(mount_point)
        .output()?;
    if !diskutil_output.status.success() {
        return Err(CbmError::CommandExecError(format!(
            "Failed to unmount '{}' using hdiutil and diskutil: {}",
            mount_point.display(),
            String::from_utf8_lossy(&diskutil_output.stderr).trim()
        )));
    }
    Ok(())
}

/// Reads the first `mount-point` of the `system-entities` in
/// `hdiutil attach -plist` output.
pub(crate) fn parse_mount_point(output: &[u8]) -> Result<PathBuf> {
    let value = plist::Value::from_reader(Cursor::new(output)).map_err(|e| {
        CbmError::MountPointNotFound(format!("hdiutil output is not a property list: {e}"))
    })?;
    value
        .as_dictionary()
        .and_then(|dict| dict.get("system-entities"))
        .and_then(|entities| entities.as_array())
        .into_iter()
        .flatten()
        .filter_map(|entity| entity.as_dictionary())
        .filter_map(|entity| entity.get("mount-point"))
        .filter_map(|mount| mount.as_string())
        .find(|mount| !mount.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| {
            CbmError::MountPointNotFound("no mount-point in hdiutil output".to_string())
        })
}

/// The single `*.app` entry at the top of a mounted volume.
pub(crate) fn find_app_bundle(mount_point: &Path) -> Result<PathBuf> {
    let mut bundles: Vec<PathBuf> = fs::read_dir(mount_point)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(APP_BUNDLE_SUFFIX))
        })
        .collect();
    bundles.sort();

    match bundles.len() {
        0 => Err(CbmError::BundleNotFound(mount_point.display().to_string())),
        1 => Ok(bundles.remove(0)),
        n => Err(CbmError::InstallError(format!(
            "Expected one application bundle in {}, found {}",
            mount_point.display(),
            n
        ))),
    }
}

/// Copies `bundle` into `target_dir` with `ditto`, replacing an existing
/// bundle of the same name.
fn copy_bundle(bundle: &Path, target_dir: &Path) -> Result<PathBuf> {
    let name = bundle
        .file_name()
        .ok_or_else(|| CbmError::BundleNotFound(bundle.display().to_string()))?;
    fs::create_dir_all(target_dir)?;
    let dest = target_dir.join(name);
    remove_existing(&dest)?;

    debug!("Executing: ditto {} {}", bundle.display(), dest.display());
    let output = Command::new("ditto")
        .arg(bundle)
        .arg(&dest)
        .output()
        .map_err(|e| CbmError::CommandExecError(format!("ditto: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ditto command failed ({}): {}", output.status, stderr);
        return Err(CbmError::InstallError(format!(
            "Failed to copy {} to {}: {}",
            bundle.display(),
            dest.display(),
            stderr.trim()
        )));
    }
    Ok(dest)
}

/// Removes whatever sits at `dest`. Symlinks are unlinked, never followed.
fn remove_existing(dest: &Path) -> Result<()> {
    let metadata = match dest.symlink_metadata() {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    debug!("Replacing existing bundle at {}", dest.display());
    if metadata.file_type().is_dir() {
        fs::remove_dir_all(dest)?;
    } else {
        fs::remove_file(dest)?;
    }
    Ok(())
}
