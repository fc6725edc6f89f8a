use std::time::Duration;

/// Format as SubRip `HH:MM:SS,mmm`, truncating below a millisecond.
///
/// Hours are not wrapped at 24; media longer than 99 hours widens the field.
pub fn format_timestamp(d: Duration) -> String {
    let ms = d.as_millis();
    let hours = ms / 3_600_000;
    let mins = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    format!("{hours:02}:{mins:02}:{secs:02},{millis:03}")
}
