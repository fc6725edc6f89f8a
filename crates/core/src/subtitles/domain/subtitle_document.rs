use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

use super::timestamp::format_timestamp;
use crate::transcription::domain::segment::Segment;

/// One numbered subtitle entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cue {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

/// Ordered cues derived from a segment sequence.
///
/// Blank segments and segments whose text exactly repeats an earlier one are
/// dropped; survivors keep their relative order and are numbered densely from 1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubtitleDocument {
    cues: Vec<Cue>,
}

impl SubtitleDocument {
    pub fn from_segments(segments: &[Segment]) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut cues = Vec::new();
        for segment in segments {
            if !seen.insert(segment.text()) || segment.is_blank() {
                continue;
            }
            cues.push(Cue {
                index: cues.len() + 1,
                start: segment.start(),
                end: segment.end(),
                text: segment.text().trim().to_string(),
            });
        }
        Self { cues }
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// SubRip text: index, time range, text, blank separator per cue.
    ///
    /// Deterministic; a document without cues renders as an empty string.
    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for cue in &self.cues {
            // Writing into a String cannot fail.
            let _ = write!(
                out,
                "{}\n{} --> {}\n{}\n\n",
                cue.index,
                format_timestamp(cue.start),
                format_timestamp(cue.end),
                cue.text
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start_ms: u64, end_ms: u64, text: &str) -> Segment {
        Segment::new(
            "en",
            Duration::from_millis(start_ms),
            Duration::from_millis(end_ms),
            text,
        )
    }

    #[test]
    fn test_empty_segments_give_empty_document() {
        let doc = SubtitleDocument::from_segments(&[]);
        assert!(doc.is_empty());
        assert_eq!(doc.to_srt(), "");
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let doc = SubtitleDocument::from_segments(&[
            seg(0, 1000, "a"),
            seg(1000, 2000, "b"),
            seg(2000, 3000, "a"),
            seg(3000, 4000, "c"),
        ]);
        let texts: Vec<_> = doc.cues().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        let indices: Vec<_> = doc.cues().iter().map(|c| c.index).collect();
        assert_eq!(indices, [1, 2, 3]);
        assert_eq!(doc.cues()[0].start, Duration::ZERO);
    }

    #[test]
    fn test_blank_segments_do_not_consume_an_index() {
        let doc = SubtitleDocument::from_segments(&[
            seg(0, 1000, "first"),
            seg(1000, 2000, "   "),
            seg(2000, 3000, ""),
            seg(3000, 4000, "second"),
        ]);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.cues()[1].index, 2);
        assert_eq!(doc.cues()[1].text, "second");
    }

    #[test]
    fn test_text_is_trimmed() {
        let doc = SubtitleDocument::from_segments(&[seg(0, 1000, "  padded text \n")]);
        assert_eq!(doc.cues()[0].text, "padded text");
    }

    #[test]
    fn test_dedup_compares_untrimmed_text() {
        let doc = SubtitleDocument::from_segments(&[seg(0, 1000, " Hi"), seg(1000, 2000, "Hi")]);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_to_srt_layout() {
        let doc = SubtitleDocument::from_segments(&[
            seg(0, 2000, "Hello"),
            seg(3_723_456, 3_724_000, "World"),
        ]);
        assert_eq!(
            doc.to_srt(),
            "1\n00:00:00,000 --> 00:00:02,000\nHello\n\n\
             2\n01:02:03,456 --> 01:02:04,000\nWorld\n\n"
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let segments = [seg(0, 2000, "Hello"), seg(2000, 3000, "there"), seg(3000, 4000, " ")];
        assert_eq!(
            SubtitleDocument::from_segments(&segments).to_srt(),
            SubtitleDocument::from_segments(&segments).to_srt()
        );
    }

    #[test]
    fn test_repeated_hello_renders_one_cue() {
        let doc = SubtitleDocument::from_segments(&[seg(0, 2000, "Hello"), seg(2000, 4000, "Hello")]);
        assert_eq!(doc.to_srt(), "1\n00:00:00,000 --> 00:00:02,000\nHello\n\n");
    }

    #[test]
    fn test_only_blank_segments_render_empty() {
        let doc = SubtitleDocument::from_segments(&[seg(0, 0, "\t"), seg(0, 1000, "  ")]);
        assert!(doc.is_empty());
        assert!(doc.to_srt().is_empty());
    }

    #[test]
    fn test_replacement_character_text_is_kept() {
        let doc = SubtitleDocument::from_segments(&[seg(0, 1000, " caf\u{FFFD}")]);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.cues()[0].text, "caf\u{FFFD}");
    }
}
