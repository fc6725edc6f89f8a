use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;
use super::pipeline_state::PipelineState;
use super::transcription_job::TranscriptionJob;
use crate::media::domain::media_transcoder::{MediaTranscoder, TranscodeError, TranscoderFactory};
use crate::media::media_extractor::MediaExtractor;
use crate::provisioning::infrastructure::artifact_provisioner::ArtifactProvisioner;
use crate::shared::cache_dir;
use crate::subtitles::domain::subtitle_document::SubtitleDocument;
use crate::subtitles::srt_writer;
use crate::transcription::domain::speech_recognizer::{RecognizerConfig, RecognizerFactory};
use crate::transcription::transcriber::Transcriber;

/// The subtitle file produced by a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtitleFile {
    pub path: PathBuf,
    pub cue_count: usize,
    pub byte_len: u64,
    /// Matroska copy of the input with the subtitles muxed in, when requested.
    pub remuxed: Option<PathBuf>,
}

/// Runs one media file through provisioning, extraction, recognition and
/// rendering, strictly in that order.
///
/// Cancellation is checked on entry to every stage and inside each
/// long-running step. Nothing is written beside the input unless rendering
/// completes.
pub struct GenerateSubtitlesUseCase {
    provisioner: ArtifactProvisioner,
    transcoder_factory: TranscoderFactory,
    recognizer_factory: RecognizerFactory,
    recognizer_config: RecognizerConfig,
    state: PipelineState,
    stage_started: Option<Instant>,
}

impl GenerateSubtitlesUseCase {
    pub fn new(
        provisioner: ArtifactProvisioner,
        transcoder_factory: TranscoderFactory,
        recognizer_factory: RecognizerFactory,
        recognizer_config: RecognizerConfig,
    ) -> Self {
        Self {
            provisioner,
            transcoder_factory,
            recognizer_factory,
            recognizer_config,
            state: PipelineState::Init,
            stage_started: None,
        }
    }

    /// Current state; terminal after `execute` returns.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn execute(
        &mut self,
        job: &TranscriptionJob,
        logger: &mut dyn PipelineLogger,
    ) -> Result<SubtitleFile, PipelineError> {
        self.state = PipelineState::Init;
        self.stage_started = Some(Instant::now());
        logger.stage(PipelineState::Init);

        let result = self.run(job, logger);

        let terminal = match &result {
            Ok(_) => PipelineState::Done,
            Err(e) if e.is_cancelled() => PipelineState::Cancelled,
            Err(_) => PipelineState::Failed,
        };
        self.transition(terminal, logger);
        result
    }

    fn run(
        &mut self,
        job: &TranscriptionJob,
        logger: &mut dyn PipelineLogger,
    ) -> Result<SubtitleFile, PipelineError> {
        if !job.input().is_file() {
            return Err(PipelineError::InputNotFound(job.input().to_path_buf()));
        }
        if job.output_overwrites_input() {
            return Err(PipelineError::OutputIsInput(job.input().to_path_buf()));
        }
        cache_dir::prepare(job.cache_dir()).map_err(|e| PipelineError::CacheDir {
            path: job.cache_dir().to_path_buf(),
            source: e,
        })?;
        let cancelled = job.cancel_flag();

        self.enter(PipelineState::ProvisioningTool, job, logger)?;
        let tools = self
            .provisioner
            .ensure_tool(job.cache_dir(), cancelled, logger)
            .map_err(|e| PipelineError::from_acquisition(PipelineState::ProvisioningTool, e))?;

        self.enter(PipelineState::ProvisioningModel, job, logger)?;
        let model_path = self
            .provisioner
            .ensure_model(job.cache_dir(), job.model(), cancelled, logger)
            .map_err(|e| PipelineError::from_acquisition(PipelineState::ProvisioningModel, e))?;

        self.enter(PipelineState::Extracting, job, logger)?;
        let transcoder = (self.transcoder_factory)(&tools);
        let waveform = MediaExtractor::new(transcoder.as_ref(), job.cache_dir())
            .extract_waveform(job.input(), cancelled, logger)
            .map_err(PipelineError::from_extraction)?;

        self.enter(PipelineState::Transcribing, job, logger)?;
        let recognizer = (self.recognizer_factory)(&model_path, &self.recognizer_config)
            .map_err(PipelineError::from_recognition)?;
        let segments = Transcriber::new(recognizer)
            .recognize(&waveform, job.language(), cancelled, logger)
            .map_err(PipelineError::from_recognition)?;
        drop(waveform);

        self.enter(PipelineState::Rendering, job, logger)?;
        let document = SubtitleDocument::from_segments(&segments);
        let path = job.subtitle_path();
        let byte_len = srt_writer::write_atomic(&path, &document.to_srt()).map_err(|e| {
            PipelineError::Output {
                path: path.clone(),
                source: e,
            }
        })?;
        logger.info(&format!(
            "Wrote {} subtitles to {}",
            document.len(),
            path.display()
        ));

        let remuxed = if job.remux() {
            self.enter(PipelineState::Remuxing, job, logger)?;
            let output = remux(transcoder.as_ref(), job, &path)?;
            logger.info(&format!("Remuxed subtitles into {}", output.display()));
            Some(output)
        } else {
            None
        };

        Ok(SubtitleFile {
            path,
            cue_count: document.len(),
            byte_len,
            remuxed,
        })
    }

    /// Move to `next` unless the job has been cancelled.
    fn enter(
        &mut self,
        next: PipelineState,
        job: &TranscriptionJob,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), PipelineError> {
        if job.is_cancelled() {
            return Err(PipelineError::Cancelled(next));
        }
        self.transition(next, logger);
        Ok(())
    }

    fn transition(&mut self, next: PipelineState, logger: &mut dyn PipelineLogger) {
        if let Some(started) = self.stage_started.take() {
            logger.timing(
                self.state.key(),
                started.elapsed().as_secs_f64() * 1000.0,
            );
        }
        self.state = next;
        if !next.is_terminal() {
            self.stage_started = Some(Instant::now());
        }
        logger.stage(next);
    }
}

/// Mux `subtitles` into `<input>.eng.mkv`, staging through a `.part` file.
fn remux(
    transcoder: &dyn MediaTranscoder,
    job: &TranscriptionJob,
    subtitles: &Path,
) -> Result<PathBuf, PipelineError> {
    let output = job.remux_path();
    let mut staging_name = output.file_name().unwrap_or_default().to_os_string();
    staging_name.push(".part");
    let staging = output.with_file_name(staging_name);

    let result = transcoder
        .mux_subtitles(job.input(), subtitles, &staging, job.cancel_flag())
        .and_then(|()| fs::rename(&staging, &output).map_err(TranscodeError::from))
        .map_err(|e| match e {
            TranscodeError::Cancelled => PipelineError::Cancelled(PipelineState::Remuxing),
            source => PipelineError::Remux {
                path: output.clone(),
                source,
            },
        });

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result.map(|()| output)
}
