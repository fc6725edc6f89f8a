use std::path::PathBuf;

use thiserror::Error;

use super::media_transcoder::TranscodeError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to create temporary audio file in {path}: {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
    #[error("transcoder produced no audio at {0}")]
    MissingOutput(PathBuf),
    #[error("failed to decode extracted audio: {0}")]
    Decode(#[from] hound::Error),
    #[error(
        "extracted audio is {channels} channel(s) at {sample_rate} Hz, expected mono at {expected} Hz"
    )]
    UnexpectedFormat {
        channels: u16,
        sample_rate: u32,
        expected: u32,
    },
}

impl ExtractionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExtractionError::Transcode(TranscodeError::Cancelled))
    }
}
