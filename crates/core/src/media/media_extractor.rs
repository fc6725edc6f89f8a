use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use hound::{SampleFormat, WavReader};

use super::domain::extraction_error::ExtractionError;
use super::domain::media_transcoder::MediaTranscoder;
use super::domain::waveform::Waveform;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::shared::progress_throttle::ProgressThrottle;

pub const EXTRACT_PROGRESS_LABEL: &str = "Converting media to wave";

/// Decodes the audio track of a media file into an in-memory [`Waveform`].
///
/// The transcoder writes a temporary WAV inside `work_dir`; that file is
/// removed before `extract_waveform` returns, whatever the outcome.
pub struct MediaExtractor<'a> {
    transcoder: &'a dyn MediaTranscoder,
    work_dir: PathBuf,
}

impl<'a> MediaExtractor<'a> {
    pub fn new(transcoder: &'a dyn MediaTranscoder, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            work_dir: work_dir.into(),
        }
    }

    pub fn extract_waveform(
        &self,
        input: &Path,
        cancelled: &AtomicBool,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Waveform, ExtractionError> {
        let wav = tempfile::Builder::new()
            .prefix("extract-")
            .suffix(".wav")
            .tempfile_in(&self.work_dir)
            .map_err(|e| ExtractionError::TempFile {
                path: self.work_dir.clone(),
                source: e,
            })?
            .into_temp_path();

        let mut throttle = ProgressThrottle::new();
        let mut on_progress = |percent: f64| {
            if let Some(fraction) = throttle.observe_fraction(percent / 100.0) {
                logger.progress(EXTRACT_PROGRESS_LABEL, fraction);
            }
        };
        self.transcoder.extract_audio(
            input,
            &wav,
            WHISPER_SAMPLE_RATE,
            &mut on_progress,
            cancelled,
        )?;

        let waveform = read_waveform(&wav)?;
        log::debug!(
            "Extracted {:.1}s of audio from {}",
            waveform.duration().as_secs_f64(),
            input.display()
        );

        if let Err(e) = wav.close() {
            log::warn!("failed to remove temporary audio file: {e}");
        }
        Ok(waveform)
    }
}

/// Read a mono WAV at the recognizer's sample rate into normalized floats.
pub fn read_waveform(path: &Path) -> Result<Waveform, ExtractionError> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => {}
        Ok(_) => return Err(ExtractionError::MissingOutput(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ExtractionError::MissingOutput(path.to_path_buf()))
        }
        Err(e) => return Err(ExtractionError::Decode(hound::Error::IoError(e))),
    }

    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.sample_rate != WHISPER_SAMPLE_RATE {
        return Err(ExtractionError::UnexpectedFormat {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            expected: WHISPER_SAMPLE_RATE,
        });
    }

    let waveform = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => {
            let pcm = reader.into_samples::<i16>().collect::<Result<Vec<_>, _>>()?;
            Waveform::from_pcm16(&pcm, spec.sample_rate)
        }
        (SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            let samples = reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?;
            Waveform::new(samples, spec.sample_rate)
        }
        (SampleFormat::Float, _) => {
            let samples = reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>()?;
            Waveform::new(samples, spec.sample_rate)
        }
    };
    Ok(waveform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::domain::media_transcoder::TranscodeError;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::test_support::{write_wav, RecordingLogger, StubTranscoder};
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_extracts_waveform_and_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        let transcoder = StubTranscoder::with_pcm(vec![0, 16384, -16384, 0]);
        let extractor = MediaExtractor::new(&transcoder, tmp.path());

        let waveform = extractor
            .extract_waveform(Path::new("movie.mp4"), &AtomicBool::new(false), &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(waveform.len(), 4);
        assert_eq!(waveform.sample_rate(), WHISPER_SAMPLE_RATE);
        assert_relative_eq!(waveform.samples()[1], 0.5);
        assert_eq!(entries(tmp.path()), 0);
    }

    #[test]
    fn test_progress_is_reported_as_fraction() {
        let tmp = TempDir::new().unwrap();
        let transcoder = StubTranscoder::with_pcm(vec![0; 16]).with_progress(vec![0.0, 50.0, 50.0, 100.0]);
        let extractor = MediaExtractor::new(&transcoder, tmp.path());
        let mut logger = RecordingLogger::default();

        extractor
            .extract_waveform(Path::new("movie.mp4"), &AtomicBool::new(false), &mut logger)
            .unwrap();

        let fractions: Vec<f64> = logger.progress.iter().map(|(_, f)| *f).collect();
        assert_eq!(fractions, vec![0.0, 0.5, 1.0]);
        assert!(logger.progress.iter().all(|(l, _)| l == EXTRACT_PROGRESS_LABEL));
    }

    #[test]
    fn test_transcode_failure_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        let transcoder = StubTranscoder::failing();
        let extractor = MediaExtractor::new(&transcoder, tmp.path());

        let err = extractor
            .extract_waveform(Path::new("movie.mp4"), &AtomicBool::new(false), &mut NullPipelineLogger)
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::Transcode(TranscodeError::Failed { .. })
        ));
        assert_eq!(entries(tmp.path()), 0);
    }

    #[test]
    fn test_cancelled_transcode_is_reported() {
        let tmp = TempDir::new().unwrap();
        let transcoder = StubTranscoder::with_pcm(vec![0; 16]);
        let extractor = MediaExtractor::new(&transcoder, tmp.path());

        let err = extractor
            .extract_waveform(Path::new("movie.mp4"), &AtomicBool::new(true), &mut NullPipelineLogger)
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(entries(tmp.path()), 0);
    }

    #[test]
    fn test_empty_output_is_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.wav");
        fs::write(&path, b"").unwrap();
        assert!(matches!(
            read_waveform(&path),
            Err(ExtractionError::MissingOutput(_))
        ));
    }

    #[test]
    fn test_stereo_output_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stereo.wav");
        write_wav(&path, 2, WHISPER_SAMPLE_RATE, &[0, 0, 0, 0]);
        assert!(matches!(
            read_waveform(&path),
            Err(ExtractionError::UnexpectedFormat { channels: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_sample_rate_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cd.wav");
        write_wav(&path, 1, 44100, &[0, 0]);
        assert!(matches!(
            read_waveform(&path),
            Err(ExtractionError::UnexpectedFormat {
                sample_rate: 44100,
                ..
            })
        ));
    }

    #[test]
    fn test_float_wav_is_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: WHISPER_SAMPLE_RATE,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0.25f32).unwrap();
        writer.write_sample(-0.5f32).unwrap();
        writer.finalize().unwrap();

        let waveform = read_waveform(&path).unwrap();
        assert_eq!(waveform.samples(), &[0.25, -0.5]);
    }
}
