pub mod domain;
pub mod infrastructure;
pub mod media_extractor;
