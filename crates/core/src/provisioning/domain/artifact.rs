use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Tool,
    Model,
}

/// On-disk condition of an artifact relative to its expected size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactState {
    Missing,
    Valid,
    SizeMismatch { actual: u64, expected: u64 },
}

/// A locally cached dependency (tool binary or model file).
///
/// An artifact is valid only when the file exists and either the expected
/// length is unknown (0) or the local length matches it exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionedArtifact {
    kind: ArtifactKind,
    path: PathBuf,
    expected_len: u64,
}

impl ProvisionedArtifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>, expected_len: u64) -> Self {
        Self {
            kind,
            path: path.into(),
            expected_len,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn expected_len(&self) -> u64 {
        self.expected_len
    }

    pub fn state(&self) -> io::Result<ArtifactState> {
        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ArtifactState::Missing),
            Err(e) => return Err(e),
        };
        if !meta.is_file() {
            return Ok(ArtifactState::Missing);
        }
        let actual = meta.len();
        if self.expected_len == 0 || actual == self.expected_len {
            Ok(ArtifactState::Valid)
        } else {
            Ok(ArtifactState::SizeMismatch {
                actual,
                expected: self.expected_len,
            })
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.state(), Ok(ArtifactState::Valid))
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
