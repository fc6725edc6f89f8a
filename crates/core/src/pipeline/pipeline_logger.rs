use std::collections::HashMap;
use std::time::Instant;

use super::pipeline_state::PipelineState;
use crate::subtitles::domain::timestamp::format_timestamp;
use crate::transcription::domain::segment::Segment;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Passed explicitly into every stage so components never reach for global
/// state, and so tests can observe or silence pipeline output.
pub trait PipelineLogger: Send {
    /// Record entry into a pipeline state.
    fn stage(&mut self, state: PipelineState);

    /// Report progress of a long-running step as a fraction in `0.0..=1.0`.
    fn progress(&mut self, label: &str, fraction: f64);

    /// Report a recognized segment as soon as it is produced.
    fn segment(&mut self, segment: &Segment);

    /// Record how long a named pipeline stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Log a recoverable problem.
    fn warn(&mut self, message: &str);

    /// Emit an end-of-pipeline summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn stage(&mut self, _state: PipelineState) {}
    fn progress(&mut self, _label: &str, _fraction: f64) {}
    fn segment(&mut self, _segment: &Segment) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
}

/// CLI-oriented logger forwarding to the `log` facade.
///
/// Tracks per-stage timing and the number of recognized segments for a
/// summary report at pipeline completion.
pub struct LogPipelineLogger {
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    segments: usize,
    last_state: Option<PipelineState>,
    messages: Vec<String>,
}

impl LogPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            segments: 0,
            last_state: None,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no stage was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Pipeline summary ({} segments, {:.1}s total):",
            self.segments,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let total_ms: f64 = self.timings[stage].iter().sum();
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!("  {stage:12}: {total_ms:9.0}ms  ({pct:4.1}%)"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn last_state(&self) -> Option<PipelineState> {
        self.last_state
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Info and warning messages in the order they were logged.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn stage(&mut self, state: PipelineState) {
        self.last_state = Some(state);
        match state {
            PipelineState::Failed => log::error!("Pipeline {state}"),
            PipelineState::Cancelled => log::warn!("Pipeline {state}"),
            _ => log::info!("Stage: {state}"),
        }
    }

    fn progress(&mut self, label: &str, fraction: f64) {
        log::info!("{label}: {:.2}%", fraction * 100.0);
    }

    fn segment(&mut self, segment: &Segment) {
        self.segments += 1;
        log::info!(
            "[{}]: {} -> {} - {}",
            segment.language(),
            format_timestamp(segment.start()),
            format_timestamp(segment.end()),
            segment.text().trim()
        );
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn warn(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::warn!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
