pub mod ffmpeg_cli_transcoder;
mod ffmpeg_progress;
