//! Timecode formatting for the delivery grammars.
//!
//! All Burnsub timestamps are integer microseconds from the start of the
//! programme. Each mux adapter needs a different textual rendition:
//! - `HH:MM:SS:FF` frame timecodes (DVD descriptors)
//! - `HH:MM:SS.mmm` clock times (timed text)
//! - `H:MM:SS.cc` centisecond times (picture-track scripts)
//! - fractional seconds (ffmpeg scripts)

/// Microseconds since programme start.
pub type Microseconds = i64;

const US_PER_MS: i64 = 1_000;
const US_PER_SEC: i64 = 1_000_000;

/// Split a non-negative microsecond value into `(hours, minutes, seconds, micros)`.
fn split(us: Microseconds) -> (i64, i64, i64, i64) {
    let us = us.max(0);
    let total_secs = us / US_PER_SEC;
    (
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        us % US_PER_SEC,
    )
}

/// Duration of one frame in microseconds.
pub fn frame_interval_us(frame_rate: f64) -> Microseconds {
    if frame_rate <= 0.0 {
        return 0;
    }
    (US_PER_SEC as f64 / frame_rate).round() as Microseconds
}

/// Format as `HH:MM:SS:FF` at the given frame rate.
///
/// The frame field is the millisecond remainder divided by the whole
/// number of milliseconds in one frame, so 25 fps counts in 40 ms steps.
pub fn format_frame_timecode(us: Microseconds, frame_rate: f64) -> String {
    let (hours, minutes, seconds, micros) = split(us);
    let ms_per_frame = (1000.0 / frame_rate.max(1.0)).floor().max(1.0) as i64;
    let frames = (micros / US_PER_MS) / ms_per_frame;
    format!("{hours:02}:{minutes:02}:{seconds:02}:{frames:02}")
}

/// Format as `HH:MM:SS.mmm`.
pub fn format_clock_millis(us: Microseconds) -> String {
    let (hours, minutes, seconds, micros) = split(us);
    let millis = micros / US_PER_MS;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Format as `H:MM:SS.cc` (unpadded hours, centiseconds).
pub fn format_centis(us: Microseconds) -> String {
    let (hours, minutes, seconds, micros) = split(us);
    let centis = micros / 10_000;
    format!("{hours}:{minutes:02}:{seconds:02}.{centis:02}")
}

/// Format as fractional seconds with three decimals.
pub fn format_seconds(us: Microseconds) -> String {
    format!("{:.3}", us as f64 / US_PER_SEC as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_timecode_at_25fps() {
        assert_eq!(format_frame_timecode(0, 25.0), "00:00:00:00");
        assert_eq!(format_frame_timecode(3_661_480_000, 25.0), "01:01:01:12");
        assert_eq!(format_frame_timecode(999_999, 25.0), "00:00:00:24");
    }

    #[test]
    fn test_frame_timecode_at_ntsc_rate() {
        // floor(1000 / 29.97) = 33 ms per frame
        assert_eq!(format_frame_timecode(500_000, 29.97), "00:00:00:15");
    }

    #[test]
    fn test_clock_millis() {
        assert_eq!(format_clock_millis(0), "00:00:00.000");
        assert_eq!(format_clock_millis(1_000_000), "00:00:01.000");
        assert_eq!(format_clock_millis(3_661_500_000), "01:01:01.500");
    }

    #[test]
    fn test_centis() {
        assert_eq!(format_centis(1_000_000), "0:00:01.00");
        assert_eq!(format_centis(5_025_670_000), "1:23:45.67");
        assert_eq!(format_centis(9_296_780_000), "2:34:56.78");
    }

    #[test]
    fn test_seconds() {
        assert_eq!(format_seconds(3_000_000), "3.000");
        assert_eq!(format_seconds(1_234_567), "1.235");
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval_us(25.0), 40_000);
        assert_eq!(frame_interval_us(0.0), 0);
    }

    #[test]
    fn test_negative_values_clamp_to_zero() {
        assert_eq!(format_clock_millis(-5), "00:00:00.000");
    }
}
