//! Media-to-SubRip subtitle generation.
//!
//! A [`pipeline::generate_subtitles_use_case::GenerateSubtitlesUseCase`]
//! provisions ffmpeg and a Whisper model into a local cache, extracts a
//! 16 kHz mono waveform from the input, runs speech recognition over it and
//! writes the deduplicated segments as an `.srt` file beside the input.

pub mod media;
pub mod pipeline;
pub mod provisioning;
pub mod shared;
pub mod subtitles;
pub mod transcription;

#[cfg(test)]
pub(crate) mod test_support;
