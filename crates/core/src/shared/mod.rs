pub mod cache_dir;
pub mod constants;
pub mod progress_throttle;
