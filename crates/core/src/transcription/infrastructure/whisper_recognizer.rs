use std::path::Path;

use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

use crate::media::domain::waveform::Waveform;
use crate::shared::constants::{AUTO_LANGUAGE, WHISPER_SAMPLE_RATE};
use crate::transcription::domain::recognition_error::RecognitionError;
use crate::transcription::domain::segment::Segment;
use crate::transcription::domain::speech_recognizer::{
    RecognizerConfig, RecognizerFactory, SegmentStream, SpeechRecognizer,
};

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model is loaded once in [`WhisperRecognizer::new`]; each call to
/// `recognize` gets a fresh inference state.
pub struct WhisperRecognizer {
    context: WhisperContext,
    threads: usize,
}

impl WhisperRecognizer {
    pub fn new(model_path: &Path, config: &RecognizerConfig) -> Result<Self, RecognitionError> {
        if !model_path.is_file() {
            return Err(RecognitionError::ModelNotFound(model_path.to_path_buf()));
        }
        let path = model_path.to_str().ok_or_else(|| {
            RecognitionError::ModelLoad(format!("invalid model path: {}", model_path.display()))
        })?;
        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| RecognitionError::ModelLoad(e.to_string()))?;

        log::info!("Loaded whisper model {}", model_path.display());
        Ok(Self {
            context,
            threads: config.threads.max(1),
        })
    }

    pub fn factory() -> RecognizerFactory {
        Box::new(|path: &Path, config: &RecognizerConfig| {
            WhisperRecognizer::new(path, config).map(|r| Box::new(r) as Box<dyn SpeechRecognizer>)
        })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn recognize(
        &self,
        waveform: &Waveform,
        language: &str,
    ) -> Result<SegmentStream, RecognitionError> {
        if waveform.sample_rate() != WHISPER_SAMPLE_RATE {
            return Err(RecognitionError::SampleRate {
                expected: WHISPER_SAMPLE_RATE,
                actual: waveform.sample_rate(),
            });
        }

        let mut state = self
            .context
            .create_state()
            .map_err(|e| RecognitionError::Inference(format!("failed to create state: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(self.threads as i32);

        state
            .full(params, waveform.samples())
            .map_err(|e| RecognitionError::Inference(e.to_string()))?;

        let language = if language == AUTO_LANGUAGE {
            let id = state.full_lang_id_from_state();
            whisper_rs::get_lang_str(id)
                .unwrap_or(AUTO_LANGUAGE)
                .to_string()
        } else {
            language.to_string()
        };
        log::debug!("Recognition language: {language}");

        let count = state.full_n_segments().max(0);
        Ok(Box::new(WhisperSegments {
            state,
            language,
            next: 0,
            count,
        }))
    }
}

/// Walks the segments of a completed inference pass, reading each lazily.
struct WhisperSegments {
    state: WhisperState,
    language: String,
    next: i32,
    count: i32,
}

impl Iterator for WhisperSegments {
    type Item = Result<Segment, RecognitionError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.count {
            let index = self.next;
            self.next += 1;
            let Some(segment) = self.state.get_segment(index) else {
                continue;
            };
            // A multibyte character split across segments is not valid UTF-8 on its own.
            match segment.to_bytes() {
                Ok(raw) => {
                    return Some(Ok(segment_from_raw(
                        &self.language,
                        segment.start_timestamp(),
                        segment.end_timestamp(),
                        raw,
                    )))
                }
                Err(e) => {
                    log::debug!("Skipping segment {index} without text: {e}");
                    continue;
                }
            }
        }
        None
    }
}

fn segment_from_raw(language: &str, start_cs: i64, end_cs: i64, raw: &[u8]) -> Segment {
    Segment::from_centiseconds(language, start_cs, end_cs, String::from_utf8_lossy(raw))
}
