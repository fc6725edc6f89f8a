use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure to acquire a tool or model artifact.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("download failed for {target}: {reason}")]
    Transport { target: String, reason: String },
    #[error("download failed for {target}: {status} {reason}")]
    Status {
        target: String,
        status: u16,
        reason: String,
    },
    #[error("download of {target} was incomplete: got {actual} of {expected} bytes")]
    Incomplete {
        target: String,
        actual: u64,
        expected: u64,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to unpack {target}: {source}")]
    Archive {
        target: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("archive {target} does not contain {entry}")]
    MissingEntry { target: String, entry: String },
    #[error("no {tool} build is published for {os}/{arch}")]
    UnsupportedPlatform {
        tool: String,
        os: &'static str,
        arch: &'static str,
    },
    #[error("download cancelled")]
    Cancelled,
}

impl AcquisitionError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
