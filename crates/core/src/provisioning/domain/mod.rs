pub mod acquisition_error;
pub mod artifact;
pub mod artifact_source;
pub mod tool_paths;
pub mod whisper_model;
