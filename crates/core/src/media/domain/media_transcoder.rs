use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use thiserror::Error;

use crate::provisioning::domain::tool_paths::ToolPaths;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: PathBuf,
        status: String,
        stderr: String,
    },
    #[error("I/O error while transcoding: {0}")]
    Io(#[from] std::io::Error),
    #[error("transcoding cancelled")]
    Cancelled,
}

/// Domain interface over the external media transcoding capability.
pub trait MediaTranscoder: Send {
    /// Decode the audio of `input` into a mono signed 16-bit PCM WAV file at
    /// `output`, ignoring minor stream errors in the source.
    ///
    /// `on_progress` receives percent-complete values (0-100) as they arrive.
    fn extract_audio(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: u32,
        on_progress: &mut dyn FnMut(f64),
        cancelled: &AtomicBool,
    ) -> Result<(), TranscodeError>;

    /// Copy the video and audio streams of `media` plus the subtitle file into
    /// a Matroska container at `output`.
    fn mux_subtitles(
        &self,
        media: &Path,
        subtitles: &Path,
        output: &Path,
        cancelled: &AtomicBool,
    ) -> Result<(), TranscodeError>;
}

/// Builds a transcoder once the tool executables have been provisioned.
pub type TranscoderFactory = Box<dyn Fn(&ToolPaths) -> Box<dyn MediaTranscoder> + Send>;
