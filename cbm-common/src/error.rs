// cbm-common/src/error.rs
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CbmError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("No build folders found at {0}")]
    NoBuildsPresent(String),

    #[error("Unsupported architecture '{0}' (expected one of win64, win32, mac, linux-x86_64)")]
    UnsupportedArchitecture(String),

    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("HTTP error {0} for URL {1}")]
    HttpStatus(u16, String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("IoError: {0}")]
    IoError(String),

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Platform unsupported: {0}")]
    PlatformUnsupported(String),

    #[error("Could not determine mount point: {0}")]
    MountPointNotFound(String),

    #[error("No application bundle found: {0}")]
    BundleNotFound(String),

    #[error("Failed to execute command: {0}")]
    CommandExecError(String),

    #[error("Installation Error: {0}")]
    InstallError(String),

    #[error("Reconciliation Error: {0}")]
    Reconcile(String),
}

/// Coarse classification of failures, used by callers deciding whether an
/// error aborts an operation or is only summarised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Resolution,
    Configuration,
    Transport,
    Extraction,
    Reconciliation,
    Storage,
}

impl CbmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CbmError::NotFound(_) | CbmError::NoBuildsPresent(_) => ErrorKind::Resolution,
            CbmError::UnsupportedArchitecture(_)
            | CbmError::UnsupportedFormat(_)
            | CbmError::ValidationError(_)
            | CbmError::Config(_) => ErrorKind::Configuration,
            CbmError::Http(_) | CbmError::HttpStatus(..) | CbmError::DownloadError(_) => {
                ErrorKind::Transport
            }
            CbmError::CorruptArchive(_)
            | CbmError::PlatformUnsupported(_)
            | CbmError::MountPointNotFound(_)
            | CbmError::BundleNotFound(_)
            | CbmError::CommandExecError(_)
            | CbmError::InstallError(_) => ErrorKind::Extraction,
            CbmError::Reconcile(_) => ErrorKind::Reconciliation,
            CbmError::Io(_) | CbmError::IoError(_) | CbmError::Json(_) => ErrorKind::Storage,
        }
    }
}

impl From<std::io::Error> for CbmError {
    fn from(err: std::io::Error) -> Self {
        CbmError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for CbmError {
    fn from(err: reqwest::Error) -> Self {
        CbmError::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for CbmError {
    fn from(err: serde_json::Error) -> Self {
        CbmError::Json(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, CbmError>;
