use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("whisper model not found at: {0}")]
    ModelNotFound(PathBuf),
    #[error("failed to load whisper model: {0}")]
    ModelLoad(String),
    #[error("whisper inference failed: {0}")]
    Inference(String),
    #[error("recognizer expects {expected} Hz audio, got {actual} Hz")]
    SampleRate { expected: u32, actual: u32 },
    #[error("recognition cancelled")]
    Cancelled,
}
