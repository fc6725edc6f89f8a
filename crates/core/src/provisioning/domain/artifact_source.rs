use std::io::Read;

use super::acquisition_error::AcquisitionError;

/// An opened remote artifact: headers have been read, the body has not.
pub struct RemoteArtifact {
    content_length: Option<u64>,
    body: Box<dyn Read + Send>,
}

impl RemoteArtifact {
    pub fn new(content_length: Option<u64>, body: Box<dyn Read + Send>) -> Self {
        Self {
            content_length,
            body,
        }
    }

    /// Declared length, or 0 when the source did not declare one.
    pub fn expected_len(&self) -> u64 {
        self.content_length.unwrap_or(0)
    }

    pub fn into_body(self) -> Box<dyn Read + Send> {
        self.body
    }
}

/// Domain interface for fetching remote artifacts.
///
/// Implementations must surface non-success responses as
/// [`AcquisitionError::Status`] before any body bytes are consumed.
pub trait ArtifactSource: Send {
    fn open(&self, url: &str) -> Result<RemoteArtifact, AcquisitionError>;
}
