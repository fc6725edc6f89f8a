use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Published ggml Whisper model variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WhisperModel {
    Tiny,
    TinyEn,
    Base,
    BaseEn,
    Small,
    SmallEn,
    Medium,
    MediumEn,
    LargeV1,
    LargeV2,
    LargeV3,
    #[default]
    LargeV3Turbo,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown model '{0}' (expected one of: {list})", list = WhisperModel::identifiers().join(", "))]
pub struct UnknownModelError(pub String);

impl WhisperModel {
    pub const ALL: &[WhisperModel] = &[
        WhisperModel::Tiny,
        WhisperModel::TinyEn,
        WhisperModel::Base,
        WhisperModel::BaseEn,
        WhisperModel::Small,
        WhisperModel::SmallEn,
        WhisperModel::Medium,
        WhisperModel::MediumEn,
        WhisperModel::LargeV1,
        WhisperModel::LargeV2,
        WhisperModel::LargeV3,
        WhisperModel::LargeV3Turbo,
    ];

    /// Identifier used on the command line and in file names, e.g. `base.en`.
    pub fn id(self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::TinyEn => "tiny.en",
            WhisperModel::Base => "base",
            WhisperModel::BaseEn => "base.en",
            WhisperModel::Small => "small",
            WhisperModel::SmallEn => "small.en",
            WhisperModel::Medium => "medium",
            WhisperModel::MediumEn => "medium.en",
            WhisperModel::LargeV1 => "large-v1",
            WhisperModel::LargeV2 => "large-v2",
            WhisperModel::LargeV3 => "large-v3",
            WhisperModel::LargeV3Turbo => "large-v3-turbo",
        }
    }

    /// Remote and local file name: `ggml-<variant>.bin`.
    pub fn file_name(self) -> String {
        format!("ggml-{}.bin", self.id())
    }

    /// English-only variants cannot recognize other languages.
    pub fn is_english_only(self) -> bool {
        self.id().ends_with(".en")
    }

    pub fn identifiers() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.id()).collect()
    }
}

impl fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for WhisperModel {
    type Err = UnknownModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.id() == wanted)
            .ok_or_else(|| UnknownModelError(s.to_string()))
    }
}
