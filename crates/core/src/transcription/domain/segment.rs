use std::time::Duration;

/// One recognized span of speech.
///
/// Times are measured from the start of the media and kept at millisecond
/// precision. `start <= end` always holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    language: String,
    start: Duration,
    end: Duration,
    text: String,
}

impl Segment {
    pub fn new(
        language: impl Into<String>,
        start: Duration,
        end: Duration,
        text: impl Into<String>,
    ) -> Self {
        let start = truncate_to_millis(start);
        let end = truncate_to_millis(end).max(start);
        Self {
            language: language.into(),
            start,
            end,
            text: text.into(),
        }
    }

    /// Build from whisper.cpp timestamps, which are in centiseconds.
    pub fn from_centiseconds(
        language: impl Into<String>,
        t0: i64,
        t1: i64,
        text: impl Into<String>,
    ) -> Self {
        Self::new(language, centis(t0), centis(t1), text)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn end(&self) -> Duration {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn truncate_to_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}

fn centis(value: i64) -> Duration {
    Duration::from_millis(value.max(0) as u64 * 10)
}
