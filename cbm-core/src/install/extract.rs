// Path: cbm-core/src/install/extract.rs
use std::fs::{self, File};
use std::io::{self, Read, Seek};
#[cfg(unix)]
use std::os::unix::fs as unix_fs;
use std::path::{Component, Path, PathBuf};

use bzip2::read::BzDecoder;
use cbm_common::error::{CbmError, Result};
use cbm_common::model::ArchiveFormat;
use tar::Archive;
use tracing::{debug, error};
use xz2::read::XzDecoder;
use zip::read::ZipArchive;

/// Unpacks the full contents of a zip or tar archive into `target_dir`.
pub fn extract_archive(archive_path: &Path, target_dir: &Path, format: ArchiveFormat) -> Result<()> {
    debug!(
        "Extracting archive '{}' ({}) to '{}'",
        archive_path.display(),
        format,
        target_dir.display()
    );

    fs::create_dir_all(target_dir).map_err(|e| {
        CbmError::IoError(format!(
            "Failed to create target directory {}: {}",
            target_dir.display(),
            e
        ))
    })?;

    let file = File::open(archive_path).map_err(|e| {
        CbmError::CorruptArchive(format!(
            "Failed to open archive {}: {}",
            archive_path.display(),
            e
        ))
    })?;

    match format {
        ArchiveFormat::Zip => extract_zip_archive(file, target_dir, archive_path),
        ArchiveFormat::TarBz2 => extract_tar_archive(BzDecoder::new(file), target_dir, archive_path),
        ArchiveFormat::TarXz => extract_tar_archive(XzDecoder::new(file), target_dir, archive_path),
        ArchiveFormat::DiskImage => Err(CbmError::UnsupportedFormat(format!(
            "{} is a disk image, not an extractable archive",
            archive_path.display()
        ))),
    }
}

/// Joins an archive entry path onto `target_dir`, refusing anything that
/// would land outside of it.
fn safe_join(target_dir: &Path, entry_path: &Path, archive_path_for_log: &Path) -> Result<PathBuf> {
    let mut out = target_dir.to_path_buf();
    for comp in entry_path.components() {
        match comp {
            Component::Normal(p) => out.push(p),
            Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                let msg = format!(
                    "Disallowed component {:?} in entry {} of {}",
                    comp,
                    entry_path.display(),
                    archive_path_for_log.display()
                );
                error!("{}", msg);
                return Err(CbmError::InstallError(msg));
            }
        }
    }
    Ok(out)
}

fn extract_tar_archive<R: Read>(
    reader: R,
    target_dir: &Path,
    archive_path_for_log: &Path,
) -> Result<()> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    let corrupt = |e: io::Error| {
        CbmError::CorruptArchive(format!(
            "Error reading TAR entry from {}: {}",
            archive_path_for_log.display(),
            e
        ))
    };

    let mut unpacked = 0usize;
    for entry_result in archive.entries().map_err(corrupt)? {
        let mut entry = entry_result.map_err(corrupt)?;
        let path_in_archive = entry.path().map_err(corrupt)?.into_owned();
        if path_in_archive.components().next().is_none() {
            continue;
        }

        let target_path = safe_join(target_dir, &path_in_archive, archive_path_for_log)?;
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Read errors surface here as well, since entries stream from the decoder.
        entry.unpack(&target_path).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData || e.kind() == io::ErrorKind::UnexpectedEof {
                corrupt(e)
            } else {
                CbmError::IoError(format!(
                    "Failed to unpack {} to {}: {}",
                    path_in_archive.display(),
                    target_path.display(),
                    e
                ))
            }
        })?;
        unpacked += 1;
    }

    debug!(
        "Finished TAR extraction for {} ({} entries)",
        archive_path_for_log.display(),
        unpacked
    );
    Ok(())
}

fn extract_zip_archive<R: Read + Seek>(
    reader: R,
    target_dir: &Path,
    archive_path_for_log: &Path,
) -> Result<()> {
    let mut archive = ZipArchive::new(reader).map_err(|e| {
        CbmError::CorruptArchive(format!(
            "Failed to open ZIP {}: {}",
            archive_path_for_log.display(),
            e
        ))
    })?;
    debug!(
        "Starting ZIP extraction for {} ({} entries)",
        archive_path_for_log.display(),
        archive.len()
    );

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| {
            CbmError::CorruptArchive(format!(
                "Error reading ZIP index {} in {}: {}",
                i,
                archive_path_for_log.display(),
                e
            ))
        })?;

        let Some(path_in_archive) = file.enclosed_name() else {
            return Err(CbmError::InstallError(format!(
                "Unsafe ZIP entry name {} in {}",
                file.name(),
                archive_path_for_log.display()
            )));
        };
        let target_path = safe_join(target_dir, &path_in_archive, archive_path_for_log)?;

        if file.is_dir() {
            fs::create_dir_all(&target_path)?;
            continue;
        }
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if file.is_symlink() {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)?;
            let link_target = PathBuf::from(String::from_utf8_lossy(&buf).to_string());
            #[cfg(unix)]
            {
                if target_path.symlink_metadata().is_ok() {
                    fs::remove_file(&target_path)?;
                }
                unix_fs::symlink(&link_target, &target_path)?;
            }
            #[cfg(not(unix))]
            {
                tracing::warn!(
                    "Cannot create symlink on non-unix system: {} -> {}",
                    target_path.display(),
                    link_target.display()
                );
            }
            continue;
        }

        let mut out_file = File::create(&target_path).map_err(|e| {
            CbmError::IoError(format!("Failed create file {}: {}", target_path.display(), e))
        })?;
        io::copy(&mut file, &mut out_file).map_err(|e| {
            CbmError::CorruptArchive(format!(
                "Failed to decompress {} from {}: {}",
                path_in_archive.display(),
                archive_path_for_log.display(),
                e
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                fs::set_permissions(&target_path, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    debug!(
        "Finished ZIP extraction for {}",
        archive_path_for_log.display()
    );
    Ok(())
}
