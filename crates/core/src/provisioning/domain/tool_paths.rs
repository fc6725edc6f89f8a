use std::path::{Path, PathBuf};

/// Locations of the provisioned transcoding executables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolPaths {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl ToolPaths {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Expected executable paths inside `dir`, with the platform's executable suffix.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join(executable_name("ffmpeg")),
            dir.join(executable_name("ffprobe")),
        )
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }

    pub fn all_present(&self) -> bool {
        self.ffmpeg.is_file() && self.ffprobe.is_file()
    }
}

/// `ffmpeg` on Unix, `ffmpeg.exe` on Windows.
pub fn executable_name(tool: &str) -> String {
    format!("{tool}{}", std::env::consts::EXE_SUFFIX)
}
