use std::fs;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::provisioning::domain::acquisition_error::AcquisitionError;
use crate::provisioning::domain::artifact::{ArtifactKind, ArtifactState, ProvisionedArtifact};
use crate::provisioning::domain::artifact_source::{ArtifactSource, RemoteArtifact};
use crate::provisioning::domain::tool_paths::{executable_name, ToolPaths};
use crate::provisioning::domain::whisper_model::WhisperModel;
use crate::provisioning::infrastructure::tool_release;
use crate::provisioning::infrastructure::zip_unpacker::unpack_executable;
use crate::shared::constants::{
    DOWNLOAD_CHUNK_SIZE, FFMPEG_RELEASE_BASE_URL, FFMPEG_VERSION, MODEL_BASE_URL, TOOL_DIR_NAME,
};
use crate::shared::progress_throttle::ProgressThrottle;

const TOOLS: [&str; 2] = ["ffmpeg", "ffprobe"];

/// Makes sure the transcoding tools and the recognition model are cached locally.
///
/// Downloads stream through the injected [`ArtifactSource`] into a `.part`
/// file that is only renamed into place once its length checks out.
pub struct ArtifactProvisioner {
    source: Box<dyn ArtifactSource>,
    model_base_url: String,
    tool_base_url: String,
    tool_version: String,
    platform: Option<&'static str>,
}

impl ArtifactProvisioner {
    pub fn new(source: Box<dyn ArtifactSource>) -> Self {
        Self {
            source,
            model_base_url: MODEL_BASE_URL.to_string(),
            tool_base_url: FFMPEG_RELEASE_BASE_URL.to_string(),
            tool_version: FFMPEG_VERSION.to_string(),
            platform: tool_release::current_platform(),
        }
    }

    pub fn with_model_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.model_base_url = base_url.into();
        self
    }

    pub fn with_tool_release(mut self, base_url: impl Into<String>, version: impl Into<String>) -> Self {
        self.tool_base_url = base_url.into();
        self.tool_version = version.into();
        self
    }

    /// Override the release platform key (`None` means unsupported).
    pub fn with_platform(mut self, platform: Option<&'static str>) -> Self {
        self.platform = platform;
        self
    }

    pub fn model_url(&self, model: WhisperModel) -> String {
        format!(
            "{}/{}",
            self.model_base_url.trim_end_matches('/'),
            model.file_name()
        )
    }

    /// Ensure `ffmpeg` and `ffprobe` exist under `<cache_dir>/ffmpeg`.
    pub fn ensure_tool(
        &self,
        cache_dir: &Path,
        cancelled: &AtomicBool,
        logger: &mut dyn PipelineLogger,
    ) -> Result<ToolPaths, AcquisitionError> {
        let tool_dir = cache_dir.join(TOOL_DIR_NAME);
        let paths = ToolPaths::in_dir(&tool_dir);
        if paths.all_present() {
            log::debug!("Using cached tools in {}", tool_dir.display());
            return Ok(paths);
        }

        fs::create_dir_all(&tool_dir).map_err(|e| AcquisitionError::write(&tool_dir, e))?;
        logger.info("FFmpeg not found - downloading...");

        for (tool, dest) in TOOLS.into_iter().zip([paths.ffmpeg(), paths.ffprobe()]) {
            let artifact = ProvisionedArtifact::new(ArtifactKind::Tool, dest, 0);
            if artifact.is_valid() {
                continue;
            }
            self.fetch_tool(tool, dest, cancelled, logger)?;
        }

        logger.info(&format!("FFmpeg ready in {}", tool_dir.display()));
        Ok(paths)
    }

    fn fetch_tool(
        &self,
        tool: &str,
        dest: &Path,
        cancelled: &AtomicBool,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), AcquisitionError> {
        let platform = self
            .platform
            .ok_or_else(|| AcquisitionError::UnsupportedPlatform {
                tool: tool.to_string(),
                os: std::env::consts::OS,
                arch: std::env::consts::ARCH,
            })?;
        let url = tool_release::archive_url(&self.tool_base_url, &self.tool_version, tool, platform);
        log::debug!("Fetching {url}");

        let remote = self.source.open(&url)?;
        let dir = dest.parent().unwrap_or(Path::new("."));
        let mut scratch = tempfile::tempfile_in(dir).map_err(|e| AcquisitionError::write(dir, e))?;
        copy_with_progress(
            remote,
            &mut scratch,
            &Transfer {
                label: &format!("Downloading {tool}"),
                target: &url,
                path: dest,
            },
            cancelled,
            logger,
        )?;
        scratch
            .seek(SeekFrom::Start(0))
            .map_err(|e| AcquisitionError::write(dest, e))?;

        unpack_executable(scratch, &executable_name(tool), dest, &url)
    }

    /// Ensure `<cache_dir>/ggml-<variant>.bin` exists with the remote's declared length.
    pub fn ensure_model(
        &self,
        cache_dir: &Path,
        model: WhisperModel,
        cancelled: &AtomicBool,
        logger: &mut dyn PipelineLogger,
    ) -> Result<PathBuf, AcquisitionError> {
        fs::create_dir_all(cache_dir).map_err(|e| AcquisitionError::write(cache_dir, e))?;

        let url = self.model_url(model);
        let remote = self.source.open(&url)?;
        let artifact = ProvisionedArtifact::new(
            ArtifactKind::Model,
            cache_dir.join(model.file_name()),
            remote.expected_len(),
        );

        match artifact
            .state()
            .map_err(|e| AcquisitionError::write(artifact.path(), e))?
        {
            ArtifactState::Valid => {
                log::debug!("Using cached model {}", artifact.path().display());
                return Ok(artifact.into_path());
            }
            ArtifactState::SizeMismatch { actual, expected } => {
                logger.warn(&format!(
                    "Model size mismatch ({actual} of {expected} bytes) - deleting model"
                ));
                fs::remove_file(artifact.path())
                    .map_err(|e| AcquisitionError::write(artifact.path(), e))?;
            }
            ArtifactState::Missing => {}
        }

        logger.info(&format!("Downloading model {model}..."));
        download_to(
            remote,
            &Transfer {
                label: &format!("Downloading {}", model.file_name()),
                target: &url,
                path: artifact.path(),
            },
            cancelled,
            logger,
        )?;

        match artifact
            .state()
            .map_err(|e| AcquisitionError::write(artifact.path(), e))?
        {
            ArtifactState::Valid => Ok(artifact.into_path()),
            ArtifactState::SizeMismatch { actual, expected } => {
                let _ = fs::remove_file(artifact.path());
                Err(AcquisitionError::Incomplete {
                    target: url,
                    actual,
                    expected,
                })
            }
            ArtifactState::Missing => Err(AcquisitionError::write(
                artifact.path(),
                std::io::Error::from(ErrorKind::NotFound),
            )),
        }
    }
}

/// Names used in progress reports and errors for one download.
struct Transfer<'a> {
    label: &'a str,
    target: &'a str,
    path: &'a Path,
}

/// Stream `remote` into `<path>.part`, then rename it to `path`.
///
/// The `.part` file is removed on any failure, including cancellation.
fn download_to(
    remote: RemoteArtifact,
    transfer: &Transfer<'_>,
    cancelled: &AtomicBool,
    logger: &mut dyn PipelineLogger,
) -> Result<u64, AcquisitionError> {
    let staging = part_path(transfer.path);
    let result = fs::File::create(&staging)
        .map_err(|e| AcquisitionError::write(&staging, e))
        .and_then(|mut file| {
            let written = copy_with_progress(remote, &mut file, transfer, cancelled, logger)?;
            file.sync_all()
                .map_err(|e| AcquisitionError::write(&staging, e))?;
            Ok(written)
        })
        .and_then(|written| {
            fs::rename(&staging, transfer.path)
                .map_err(|e| AcquisitionError::write(transfer.path, e))?;
            Ok(written)
        });

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Copy the remote body into `out` in [`DOWNLOAD_CHUNK_SIZE`] reads.
///
/// Cancellation is polled before every read. When the remote declared a
/// length, a short body is reported as [`AcquisitionError::Incomplete`].
fn copy_with_progress(
    remote: RemoteArtifact,
    out: &mut impl Write,
    transfer: &Transfer<'_>,
    cancelled: &AtomicBool,
    logger: &mut dyn PipelineLogger,
) -> Result<u64, AcquisitionError> {
    let expected = remote.expected_len();
    let mut body = remote.into_body();
    let mut buf = vec![0u8; DOWNLOAD_CHUNK_SIZE];
    let mut throttle = ProgressThrottle::new();
    let mut written: u64 = 0;

    loop {
        if cancelled.load(Ordering::Relaxed) {
            return Err(AcquisitionError::Cancelled);
        }
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(AcquisitionError::Transport {
                    target: transfer.target.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        out.write_all(&buf[..n])
            .map_err(|e| AcquisitionError::write(transfer.path, e))?;
        written += n as u64;

        if let Some(fraction) = throttle.observe(written, expected) {
            logger.progress(transfer.label, fraction);
        }
    }

    out.flush()
        .map_err(|e| AcquisitionError::write(transfer.path, e))?;

    if expected > 0 && written != expected {
        return Err(AcquisitionError::Incomplete {
            target: transfer.target.to_string(),
            actual: written,
            expected,
        });
    }
    Ok(written)
}
