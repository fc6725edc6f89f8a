use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use super::ffmpeg_progress::{
    parse_probe_duration, parse_progress_line, percent_complete, stderr_tail, ProgressEvent,
};
use crate::media::domain::media_transcoder::{MediaTranscoder, TranscodeError, TranscoderFactory};
use crate::provisioning::domain::tool_paths::ToolPaths;
use crate::shared::constants::REMUX_LANGUAGE;

/// How often the job thread wakes to check for cancellation while ffmpeg is quiet.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STDERR_TAIL_LINES: usize = 20;

/// [`MediaTranscoder`] driving the provisioned `ffmpeg`/`ffprobe` executables.
///
/// ffmpeg writes `-progress` records to stdout; a reader thread parses them
/// and forwards them over a channel so the calling thread can report
/// progress and kill the child as soon as cancellation is requested.
pub struct FfmpegCliTranscoder {
    tools: ToolPaths,
}

impl FfmpegCliTranscoder {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    pub fn factory() -> TranscoderFactory {
        Box::new(|tools: &ToolPaths| {
            Box::new(FfmpegCliTranscoder::new(tools.clone())) as Box<dyn MediaTranscoder>
        })
    }

    /// Container duration as reported by ffprobe, if it can be determined.
    fn probe_duration(&self, input: &Path) -> Option<Duration> {
        let output = Command::new(self.tools.ffprobe())
            .args(["-v", "error", "-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(input)
            .stdin(Stdio::null())
            .output();
        match output {
            Ok(out) if out.status.success() => {
                parse_probe_duration(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                log::debug!(
                    "ffprobe exited with {}: {}",
                    out.status,
                    stderr_tail(&String::from_utf8_lossy(&out.stderr), STDERR_TAIL_LINES)
                );
                None
            }
            Err(e) => {
                log::debug!("ffprobe could not be started: {e}");
                None
            }
        }
    }

    fn run(
        &self,
        mut command: Command,
        total: Option<Duration>,
        on_progress: &mut dyn FnMut(f64),
        cancelled: &AtomicBool,
    ) -> Result<(), TranscodeError> {
        let tool = self.tools.ffmpeg().to_path_buf();
        log::debug!("Running {command:?}");

        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TranscodeError::Launch {
                tool: tool.clone(),
                source: e,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("ffmpeg stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("ffmpeg stderr was not captured"))?;

        let (tx, rx) = crossbeam_channel::unbounded::<ProgressEvent>();
        let progress_reader = thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if let Some(event) = parse_progress_line(&line) {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            }
        });
        let stderr_reader = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        });

        loop {
            if cancelled.load(Ordering::Relaxed) {
                // Reader threads exit on their own once the pipes close.
                terminate(&mut child);
                return Err(TranscodeError::Cancelled);
            }
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(ProgressEvent::OutTime(position)) => {
                    if let Some(percent) = percent_complete(position, total) {
                        on_progress(percent);
                    }
                }
                Ok(ProgressEvent::End) => on_progress(100.0),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // stdout can close before the process exits.
        let status = loop {
            if cancelled.load(Ordering::Relaxed) {
                terminate(&mut child);
                return Err(TranscodeError::Cancelled);
            }
            if let Some(status) = child.try_wait()? {
                break status;
            }
            thread::sleep(POLL_INTERVAL);
        };
        let _ = progress_reader.join();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(TranscodeError::Failed {
                tool,
                status: status.to_string(),
                stderr: stderr_tail(&stderr, STDERR_TAIL_LINES),
            });
        }
        Ok(())
    }

    fn ffmpeg(&self) -> Command {
        let mut command = Command::new(self.tools.ffmpeg());
        command.args(["-hide_banner", "-nostdin", "-v", "error"]);
        command
    }
}

fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("failed to kill ffmpeg: {e}");
    }
    let _ = child.wait();
}

impl MediaTranscoder for FfmpegCliTranscoder {
    fn extract_audio(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: u32,
        on_progress: &mut dyn FnMut(f64),
        cancelled: &AtomicBool,
    ) -> Result<(), TranscodeError> {
        let total = self.probe_duration(input);
        let mut command = self.ffmpeg();
        command
            .args(["-err_detect", "ignore_err"])
            .arg("-i")
            .arg(input)
            .args(["-vn", "-ac", "1", "-ar"])
            .arg(sample_rate.to_string())
            .args(["-c:a", "pcm_s16le", "-f", "wav"])
            .args(["-progress", "pipe:1", "-nostats", "-y"])
            .arg(output);
        self.run(command, total, on_progress, cancelled)
    }

    fn mux_subtitles(
        &self,
        media: &Path,
        subtitles: &Path,
        output: &Path,
        cancelled: &AtomicBool,
    ) -> Result<(), TranscodeError> {
        let mut command = self.ffmpeg();
        command
            .arg("-i")
            .arg(media)
            .arg("-i")
            .arg(subtitles)
            .args(["-map", "0:v?", "-map", "0:a?", "-map", "1"])
            .args(["-c", "copy", "-c:s", "srt", "-metadata:s:s:0"])
            .arg(format!("language={REMUX_LANGUAGE}"))
            .args(["-f", "matroska", "-progress", "pipe:1", "-nostats", "-y"])
            .arg(output);
        self.run(command, None, &mut |_| {}, cancelled)
    }
}
