pub mod extraction_error;
pub mod media_transcoder;
pub mod waveform;
