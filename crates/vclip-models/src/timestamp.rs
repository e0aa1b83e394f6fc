//! Timestamp formatting for captions, summaries and subtitle files.

/// Format seconds as `H:MM:SS`, or `M:SS` under an hour.
///
/// Fractional seconds are truncated.
///
/// # Examples
/// ```
/// use vclip_models::timestamp::format_time;
/// assert_eq!(format_time(3725.0), "1:02:05");
/// assert_eq!(format_time(90.0), "1:30");
/// ```
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (h, rem) = (total / 3600, total % 3600);
    let (m, s) = (rem / 60, rem % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Format seconds as an SRT cue timestamp, `HH:MM:SS,mmm`.
///
/// # Examples
/// ```
/// use vclip_models::timestamp::format_srt_time;
/// assert_eq!(format_srt_time(3725.25), "01:02:05,250");
/// ```
pub fn format_srt_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let whole = seconds.trunc() as u64;
    let ms = (seconds.fract() * 1000.0) as u64;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        whole / 3600,
        (whole % 3600) / 60,
        whole % 60,
        ms.min(999)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(3725.0), "1:02:05");
        assert_eq!(format_time(90.0), "1:30");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(3600.0), "1:00:00");
    }

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(3725.25), "01:02:05,250");
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(1.5), "00:00:01,500");
    }

    #[test]
    fn test_negative_clamped() {
        assert_eq!(format_time(-4.0), "0:00");
        assert_eq!(format_srt_time(-1.0), "00:00:00,000");
    }
}
