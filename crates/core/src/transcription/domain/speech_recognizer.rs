use std::path::Path;

use super::recognition_error::RecognitionError;
use super::segment::Segment;
use crate::media::domain::waveform::Waveform;

/// Lazy, finite, forward-only sequence of recognized segments.
pub type SegmentStream = Box<dyn Iterator<Item = Result<Segment, RecognitionError>>>;

/// Domain interface for speech-to-text recognition.
///
/// Implementations run inference on a 16 kHz mono waveform and hand back the
/// segments in start-time order.
pub trait SpeechRecognizer: Send {
    fn recognize(&self, waveform: &Waveform, language: &str)
        -> Result<SegmentStream, RecognitionError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognizerConfig {
    pub threads: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Builds a recognizer once the model file is on disk. Loading can fail
/// (corrupt model, out of memory) and is reported as a recognition error.
pub type RecognizerFactory = Box<
    dyn Fn(&Path, &RecognizerConfig) -> Result<Box<dyn SpeechRecognizer>, RecognitionError> + Send,
>;
