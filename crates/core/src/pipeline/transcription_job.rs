use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::provisioning::domain::whisper_model::WhisperModel;
use crate::shared::constants::{AUTO_LANGUAGE, REMUX_EXTENSION, SUBTITLE_EXTENSION};

/// Parameters of one subtitle generation run. Immutable once built.
#[derive(Clone, Debug)]
pub struct TranscriptionJob {
    input: PathBuf,
    cache_dir: PathBuf,
    model: WhisperModel,
    language: String,
    remux: bool,
    cancelled: Arc<AtomicBool>,
}

impl TranscriptionJob {
    pub fn new(
        input: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        model: WhisperModel,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            input: input.into(),
            cache_dir: cache_dir.into(),
            model,
            language: AUTO_LANGUAGE.to_string(),
            remux: false,
            cancelled,
        }
    }

    /// Override language auto-detection with a whisper language code.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Also mux the subtitles into a copy of the input container.
    pub fn with_remux(mut self, remux: bool) -> Self {
        self.remux = remux;
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn model(&self) -> WhisperModel {
        self.model
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn remux(&self) -> bool {
        self.remux
    }

    pub fn cancel_flag(&self) -> &AtomicBool {
        &self.cancelled
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// `<input-base-name>.srt` beside the input.
    pub fn subtitle_path(&self) -> PathBuf {
        self.input.with_extension(SUBTITLE_EXTENSION)
    }

    /// True when the input is itself an `.srt` file, so rendering would replace it.
    pub fn output_overwrites_input(&self) -> bool {
        self.input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SUBTITLE_EXTENSION))
    }

    /// `<input-base-name>.eng.mkv` beside the input.
    pub fn remux_path(&self) -> PathBuf {
        self.input.with_extension(REMUX_EXTENSION)
    }
}
