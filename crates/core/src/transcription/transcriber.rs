use std::sync::atomic::{AtomicBool, Ordering};

use super::domain::recognition_error::RecognitionError;
use super::domain::segment::Segment;
use super::domain::speech_recognizer::SpeechRecognizer;
use crate::media::domain::waveform::Waveform;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Drains a recognizer's segment stream, logging each segment as it arrives.
pub struct Transcriber {
    recognizer: Box<dyn SpeechRecognizer>,
}

impl Transcriber {
    pub fn new(recognizer: Box<dyn SpeechRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Recognize `waveform`, returning segments in start-time order.
    ///
    /// Cancellation is checked before each segment is pulled; once it is
    /// observed every segment produced so far is discarded.
    pub fn recognize(
        &self,
        waveform: &Waveform,
        language: &str,
        cancelled: &AtomicBool,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<Segment>, RecognitionError> {
        if cancelled.load(Ordering::Relaxed) {
            return Err(RecognitionError::Cancelled);
        }
        let mut stream = self.recognizer.recognize(waveform, language)?;

        let mut segments = Vec::new();
        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Err(RecognitionError::Cancelled);
            }
            let Some(next) = stream.next() else {
                break;
            };
            let segment = next?;
            logger.segment(&segment);
            segments.push(segment);
        }
        Ok(segments)
    }
}
