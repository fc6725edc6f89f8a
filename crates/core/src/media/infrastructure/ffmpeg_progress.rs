use std::time::Duration;

/// One parsed record from ffmpeg's `-progress` key/value stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProgressEvent {
    OutTime(Duration),
    End,
}

/// Parse a single `key=value` line written by `ffmpeg -progress pipe:1`.
///
/// Both `out_time_us` and `out_time_ms` carry microseconds (the latter is
/// misnamed upstream). Unknown keys and `N/A` values yield `None`.
pub(crate) fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_us" | "out_time_ms" => {
            let micros: i64 = value.trim().parse().ok()?;
            Some(ProgressEvent::OutTime(Duration::from_micros(
                micros.max(0) as u64,
            )))
        }
        "progress" if value.trim() == "end" => Some(ProgressEvent::End),
        _ => None,
    }
}

/// Percent of `total` covered by `position`, capped at 100.
pub(crate) fn percent_complete(position: Duration, total: Option<Duration>) -> Option<f64> {
    let total = total.filter(|t| !t.is_zero())?;
    Some((position.as_secs_f64() / total.as_secs_f64() * 100.0).min(100.0))
}

/// Parse the bare `format=duration` value printed by ffprobe.
pub(crate) fn parse_probe_duration(output: &str) -> Option<Duration> {
    let secs: f64 = output.lines().next()?.trim().parse().ok()?;
    if secs.is_finite() && secs > 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

/// Last `max_lines` non-empty lines of a tool's stderr.
pub(crate) fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
