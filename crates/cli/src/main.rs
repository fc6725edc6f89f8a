use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use subforge_core::media::infrastructure::ffmpeg_cli_transcoder::FfmpegCliTranscoder;
use subforge_core::pipeline::generate_subtitles_use_case::GenerateSubtitlesUseCase;
use subforge_core::pipeline::pipeline_error::PipelineError;
use subforge_core::pipeline::pipeline_logger::{LogPipelineLogger, PipelineLogger};
use subforge_core::pipeline::transcription_job::TranscriptionJob;
use subforge_core::provisioning::domain::whisper_model::WhisperModel;
use subforge_core::provisioning::infrastructure::artifact_provisioner::ArtifactProvisioner;
use subforge_core::provisioning::infrastructure::http_artifact_source::HttpArtifactSource;
use subforge_core::shared::cache_dir;
use subforge_core::shared::constants::AUTO_LANGUAGE;
use subforge_core::transcription::domain::speech_recognizer::RecognizerConfig;
use subforge_core::transcription::infrastructure::whisper_recognizer::WhisperRecognizer;

const EXIT_FAILURE: i32 = 1;
const EXIT_INPUT_NOT_FOUND: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

/// Generate SubRip subtitles for an audio or video file.
#[derive(Parser)]
#[command(name = "subforge", version)]
struct Cli {
    /// Input audio or video file. Subtitles are written beside it as <name>.srt.
    input: PathBuf,

    /// Whisper model variant (tiny, base.en, large-v3-turbo, ...).
    #[arg(long, default_value_t = WhisperModel::default())]
    model: WhisperModel,

    /// Spoken language code, or "auto" to detect it.
    #[arg(long, default_value = AUTO_LANGUAGE)]
    language: String,

    /// Recognizer threads (default: all available cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Directory for the downloaded ffmpeg build and model files.
    #[arg(long, conflicts_with = "shared_cache")]
    cache_dir: Option<PathBuf>,

    /// Use the per-user cache directory instead of ./.subforge-cache.
    #[arg(long)]
    shared_cache: bool,

    /// Also write <name>.eng.mkv with the subtitles muxed in.
    #[arg(long)]
    remux: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(exit_code(e.as_ref()));
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    ctrlc::set_handler(move || {
        if !flag.swap(true, Ordering::Relaxed) {
            log::warn!("Cancelling after the current step...");
        }
    })?;

    let job = TranscriptionJob::new(&cli.input, resolve_cache_dir(&cli)?, cli.model, cancelled)
        .with_language(cli.language.trim().to_lowercase())
        .with_remux(cli.remux);
    log::info!(
        "Transcribing {} with model {} (cache: {})",
        job.input().display(),
        job.model(),
        job.cache_dir().display()
    );

    let config = match cli.threads {
        Some(threads) => RecognizerConfig { threads },
        None => RecognizerConfig::default(),
    };
    let provisioner = ArtifactProvisioner::new(Box::new(HttpArtifactSource::new()?));
    let mut use_case = GenerateSubtitlesUseCase::new(
        provisioner,
        FfmpegCliTranscoder::factory(),
        WhisperRecognizer::factory(),
        config,
    );

    let mut logger = LogPipelineLogger::new();
    let result = use_case.execute(&job, &mut logger);
    logger.summary();

    let file = result?;
    log::info!(
        "Output written to {} ({} subtitles)",
        file.path.display(),
        file.cue_count
    );
    if let Some(mkv) = &file.remuxed {
        log::info!("Remuxed copy written to {}", mkv.display());
    }
    Ok(())
}

fn resolve_cache_dir(cli: &Cli) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(dir) = &cli.cache_dir {
        return Ok(dir.clone());
    }
    if cli.shared_cache {
        return cache_dir::shared_cache_dir()
            .ok_or_else(|| "Could not determine the per-user cache directory".into());
    }
    Ok(cache_dir::local_cache_dir()?)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.threads == Some(0) {
        return Err("Threads must be at least 1".into());
    }
    let language = cli.language.trim();
    if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!(
            "Language must be a language code such as 'en' or 'auto', got '{}'",
            cli.language
        )
        .into());
    }
    let language = language.to_lowercase();
    if cli.model.is_english_only() && language != "en" && language != AUTO_LANGUAGE {
        return Err(format!(
            "Model {} only recognizes English, got language '{language}'",
            cli.model
        )
        .into());
    }
    Ok(())
}

fn exit_code(error: &(dyn std::error::Error + 'static)) -> i32 {
    match error.downcast_ref::<PipelineError>() {
        Some(PipelineError::InputNotFound(_)) => EXIT_INPUT_NOT_FOUND,
        Some(e) if e.is_cancelled() => EXIT_CANCELLED,
        _ => EXIT_FAILURE,
    }
}
