use std::path::PathBuf;

use thiserror::Error;

use super::pipeline_state::PipelineState;
use crate::media::domain::extraction_error::ExtractionError;
use crate::media::domain::media_transcoder::TranscodeError;
use crate::provisioning::domain::acquisition_error::AcquisitionError;
use crate::transcription::domain::recognition_error::RecognitionError;

/// Failure of a subtitle generation job, tagged with the stage it occurred in.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
    #[error("refusing to overwrite input {0} with its own subtitles")]
    OutputIsInput(PathBuf),
    #[error("failed to prepare cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} failed: {source}")]
    Acquisition {
        stage: PipelineState,
        #[source]
        source: AcquisitionError,
    },
    #[error("extracting audio failed: {0}")]
    Extraction(#[source] ExtractionError),
    #[error("speech recognition failed: {0}")]
    Recognition(#[source] RecognitionError),
    #[error("failed to write subtitle file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remux subtitles into {path}: {source}")]
    Remux {
        path: PathBuf,
        #[source]
        source: TranscodeError,
    },
    #[error("cancelled while {0}")]
    Cancelled(PipelineState),
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled(_))
    }

    /// Stage the job was in when the error occurred.
    pub fn stage(&self) -> PipelineState {
        match self {
            PipelineError::InputNotFound(_)
            | PipelineError::OutputIsInput(_)
            | PipelineError::CacheDir { .. } => PipelineState::Init,
            PipelineError::Acquisition { stage, .. } => *stage,
            PipelineError::Extraction(_) => PipelineState::Extracting,
            PipelineError::Recognition(_) => PipelineState::Transcribing,
            PipelineError::Output { .. } => PipelineState::Rendering,
            PipelineError::Remux { .. } => PipelineState::Remuxing,
            PipelineError::Cancelled(stage) => *stage,
        }
    }

    pub(crate) fn from_acquisition(stage: PipelineState, source: AcquisitionError) -> Self {
        match source {
            AcquisitionError::Cancelled => PipelineError::Cancelled(stage),
            source => PipelineError::Acquisition { stage, source },
        }
    }

    pub(crate) fn from_extraction(source: ExtractionError) -> Self {
        if source.is_cancelled() {
            PipelineError::Cancelled(PipelineState::Extracting)
        } else {
            PipelineError::Extraction(source)
        }
    }

    pub(crate) fn from_recognition(source: RecognitionError) -> Self {
        match source {
            RecognitionError::Cancelled => PipelineError::Cancelled(PipelineState::Transcribing),
            source => PipelineError::Recognition(source),
        }
    }
}
