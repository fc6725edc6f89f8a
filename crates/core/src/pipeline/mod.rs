pub mod generate_subtitles_use_case;
pub mod pipeline_error;
pub mod pipeline_logger;
pub mod pipeline_state;
pub mod transcription_job;
