//! Stub ports and fixtures shared by the unit tests.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::media::domain::media_transcoder::{MediaTranscoder, TranscodeError};
use crate::media::domain::waveform::Waveform;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::pipeline_state::PipelineState;
use crate::provisioning::domain::acquisition_error::AcquisitionError;
use crate::provisioning::domain::artifact_source::{ArtifactSource, RemoteArtifact};
use crate::transcription::domain::recognition_error::RecognitionError;
use crate::transcription::domain::segment::Segment;
use crate::transcription::domain::speech_recognizer::{SegmentStream, SpeechRecognizer};

// ─── Fixtures ───

pub(crate) fn seg(start_ms: u64, end_ms: u64, text: &str) -> Segment {
    Segment::new(
        "en",
        Duration::from_millis(start_ms),
        Duration::from_millis(end_ms),
        text,
    )
}

fn pcm16_spec(channels: u16, sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn try_write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) -> hound::Result<()> {
    let mut writer = hound::WavWriter::create(path, pcm16_spec(channels, sample_rate))?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()
}

pub(crate) fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
    try_write_wav(path, channels, sample_rate, samples).unwrap();
}

pub(crate) fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ─── Stubs ───

enum StubResponse {
    Body { declared: Option<u64>, bytes: Vec<u8> },
    Status { status: u16, reason: String },
}

#[derive(Default)]
struct SourceLogInner {
    opened: Vec<String>,
    bytes_read: u64,
}

/// Observations made by a [`StubArtifactSource`], readable after it is boxed.
#[derive(Clone, Default)]
pub(crate) struct SourceLog {
    inner: Arc<Mutex<SourceLogInner>>,
}

impl SourceLog {
    pub(crate) fn opened(&self) -> Vec<String> {
        self.inner.lock().unwrap().opened.clone()
    }

    pub(crate) fn bytes_read(&self) -> u64 {
        self.inner.lock().unwrap().bytes_read
    }
}

/// In-memory [`ArtifactSource`]. Unknown URLs answer 404.
pub(crate) struct StubArtifactSource {
    responses: HashMap<String, StubResponse>,
    log: SourceLog,
    cancel_on_read: Option<Arc<AtomicBool>>,
}

impl StubArtifactSource {
    pub(crate) fn new() -> Self {
        Self {
            responses: HashMap::new(),
            log: SourceLog::default(),
            cancel_on_read: None,
        }
    }

    pub(crate) fn with_body(mut self, url: &str, declared: Option<u64>, bytes: &[u8]) -> Self {
        self.responses.insert(
            url.to_string(),
            StubResponse::Body {
                declared,
                bytes: bytes.to_vec(),
            },
        );
        self
    }

    pub(crate) fn with_status(mut self, url: &str, status: u16, reason: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            StubResponse::Status {
                status,
                reason: reason.to_string(),
            },
        );
        self
    }

    /// Raise `flag` as soon as any body bytes are read.
    pub(crate) fn cancel_on_read(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_on_read = Some(flag);
        self
    }

    pub(crate) fn log(&self) -> SourceLog {
        self.log.clone()
    }
}

impl ArtifactSource for StubArtifactSource {
    fn open(&self, url: &str) -> Result<RemoteArtifact, AcquisitionError> {
        self.log.inner.lock().unwrap().opened.push(url.to_string());
        match self.responses.get(url) {
            Some(StubResponse::Body { declared, bytes }) => Ok(RemoteArtifact::new(
                *declared,
                Box::new(StubBody {
                    data: Cursor::new(bytes.clone()),
                    log: self.log.clone(),
                    cancel_on_read: self.cancel_on_read.clone(),
                }),
            )),
            Some(StubResponse::Status { status, reason }) => Err(AcquisitionError::Status {
                target: url.to_string(),
                status: *status,
                reason: reason.clone(),
            }),
            None => Err(AcquisitionError::Status {
                target: url.to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }
}

struct StubBody {
    data: Cursor<Vec<u8>>,
    log: SourceLog,
    cancel_on_read: Option<Arc<AtomicBool>>,
}

impl Read for StubBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        self.log.inner.lock().unwrap().bytes_read += n as u64;
        if n > 0 {
            if let Some(flag) = &self.cancel_on_read {
                flag.store(true, Ordering::Relaxed);
            }
        }
        Ok(n)
    }
}

#[derive(Default)]
struct TranscoderCallsInner {
    extractions: usize,
    muxed: Vec<(PathBuf, PathBuf)>,
}

#[derive(Clone, Default)]
pub(crate) struct TranscoderCalls {
    inner: Arc<Mutex<TranscoderCallsInner>>,
}

impl TranscoderCalls {
    pub(crate) fn extractions(&self) -> usize {
        self.inner.lock().unwrap().extractions
    }

    /// `(media, subtitles)` pairs passed to `mux_subtitles`.
    pub(crate) fn muxed(&self) -> Vec<(PathBuf, PathBuf)> {
        self.inner.lock().unwrap().muxed.clone()
    }
}

/// Writes a fixed mono PCM waveform instead of running ffmpeg.
#[derive(Clone)]
pub(crate) struct StubTranscoder {
    pcm: Vec<i16>,
    progress: Vec<f64>,
    fail_extract: bool,
    fail_mux: bool,
    calls: TranscoderCalls,
}

impl StubTranscoder {
    pub(crate) fn with_pcm(pcm: Vec<i16>) -> Self {
        Self {
            pcm,
            progress: Vec::new(),
            fail_extract: false,
            fail_mux: false,
            calls: TranscoderCalls::default(),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail_extract: true,
            ..Self::with_pcm(Vec::new())
        }
    }

    /// Percent values reported during extraction.
    pub(crate) fn with_progress(mut self, progress: Vec<f64>) -> Self {
        self.progress = progress;
        self
    }

    pub(crate) fn failing_mux(mut self) -> Self {
        self.fail_mux = true;
        self
    }

    pub(crate) fn calls(&self) -> TranscoderCalls {
        self.calls.clone()
    }

    fn failure() -> TranscodeError {
        TranscodeError::Failed {
            tool: PathBuf::from("ffmpeg"),
            status: "exit status: 1".to_string(),
            stderr: "Invalid data found when processing input".to_string(),
        }
    }
}

impl MediaTranscoder for StubTranscoder {
    fn extract_audio(
        &self,
        _input: &Path,
        output: &Path,
        sample_rate: u32,
        on_progress: &mut dyn FnMut(f64),
        cancelled: &AtomicBool,
    ) -> Result<(), TranscodeError> {
        self.calls.inner.lock().unwrap().extractions += 1;
        if cancelled.load(Ordering::Relaxed) {
            return Err(TranscodeError::Cancelled);
        }
        for &p in &self.progress {
            on_progress(p);
        }
        if self.fail_extract {
            return Err(Self::failure());
        }
        try_write_wav(output, 1, sample_rate, &self.pcm)
            .map_err(|e| TranscodeError::Io(io::Error::other(e.to_string())))
    }

    fn mux_subtitles(
        &self,
        media: &Path,
        subtitles: &Path,
        output: &Path,
        cancelled: &AtomicBool,
    ) -> Result<(), TranscodeError> {
        self.calls
            .inner
            .lock()
            .unwrap()
            .muxed
            .push((media.to_path_buf(), subtitles.to_path_buf()));
        if cancelled.load(Ordering::Relaxed) {
            return Err(TranscodeError::Cancelled);
        }
        if self.fail_mux {
            return Err(Self::failure());
        }
        fs::write(output, b"matroska")?;
        Ok(())
    }
}

/// Replays a fixed list of segments.
#[derive(Clone)]
pub(crate) struct StubRecognizer {
    segments: Vec<Segment>,
    cancel_after: Option<(usize, Arc<AtomicBool>)>,
    fail_after: Option<usize>,
    languages: Arc<Mutex<Vec<String>>>,
}

impl StubRecognizer {
    pub(crate) fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            cancel_after: None,
            fail_after: None,
            languages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Raise `flag` once `count` segments have been yielded.
    pub(crate) fn cancel_after(mut self, count: usize, flag: Arc<AtomicBool>) -> Self {
        self.cancel_after = Some((count, flag));
        self
    }

    /// Yield an inference error after `count` segments.
    pub(crate) fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Language hints received, in call order.
    pub(crate) fn languages(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.languages)
    }
}

impl SpeechRecognizer for StubRecognizer {
    fn recognize(
        &self,
        _waveform: &Waveform,
        language: &str,
    ) -> Result<SegmentStream, RecognitionError> {
        self.languages.lock().unwrap().push(language.to_string());

        let mut items: Vec<Result<Segment, RecognitionError>> =
            self.segments.iter().cloned().map(Ok).collect();
        if let Some(count) = self.fail_after {
            items.truncate(count);
            items.push(Err(RecognitionError::Inference("decoder failed".to_string())));
        }

        let cancel_after = self.cancel_after.clone();
        Ok(Box::new(items.into_iter().enumerate().map(
            move |(i, item)| {
                if let Some((count, flag)) = &cancel_after {
                    if i + 1 >= *count {
                        flag.store(true, Ordering::Relaxed);
                    }
                }
                item
            },
        )))
    }
}

/// Captures every logger event for assertions.
#[derive(Default)]
pub(crate) struct RecordingLogger {
    pub states: Vec<PipelineState>,
    pub progress: Vec<(String, f64)>,
    pub segments: Vec<Segment>,
    pub timings: Vec<(String, f64)>,
    pub infos: Vec<String>,
    pub warnings: Vec<String>,
}

impl PipelineLogger for RecordingLogger {
    fn stage(&mut self, state: PipelineState) {
        self.states.push(state);
    }

    fn progress(&mut self, label: &str, fraction: f64) {
        self.progress.push((label.to_string(), fraction));
    }

    fn segment(&mut self, segment: &Segment) {
        self.segments.push(segment.clone());
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings.push((stage.to_string(), duration_ms));
    }

    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}
