/// Sample rate whisper.cpp expects its input PCM at.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Language hint that lets the recognizer detect the spoken language.
pub const AUTO_LANGUAGE: &str = "auto";

pub const MODEL_BASE_URL: &str =
    "https://huggingface.co/sandrohanea/whisper.net/resolve/main/classic";

pub const FFMPEG_RELEASE_BASE_URL: &str =
    "https://github.com/ffbinaries/ffbinaries-prebuilt/releases/download";
pub const FFMPEG_VERSION: &str = "6.1";

/// Hidden cache directory created beside the working directory.
pub const CACHE_DIR_NAME: &str = ".subforge-cache";
/// Application directory under the per-user cache root.
pub const SHARED_CACHE_DIR_NAME: &str = "subforge";
/// Subdirectory of the cache holding the ffmpeg/ffprobe executables.
pub const TOOL_DIR_NAME: &str = "ffmpeg";

pub const SUBTITLE_EXTENSION: &str = "srt";
pub const REMUX_EXTENSION: &str = "eng.mkv";
pub const REMUX_LANGUAGE: &str = "eng";

/// Read buffer for streamed downloads.
pub const DOWNLOAD_CHUNK_SIZE: usize = 1024 * 1024;

/// Decimal places progress fractions are rounded to before deciding to report.
pub const PROGRESS_DECIMALS: i32 = 4;
