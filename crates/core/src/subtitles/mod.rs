pub mod domain;
pub mod srt_writer;
