pub mod subtitle_document;
pub mod timestamp;
