//! Seconds formatting for logs and human-facing output.

/// Format seconds into `HH:MM:SS` or `HH:MM:SS.mmm`.
///
/// # Examples
/// ```
/// use themecut_models::timeline::format_seconds;
/// assert_eq!(format_seconds(5400.0), "01:30:00");
/// assert_eq!(format_seconds(90.5), "00:01:30.500");
/// ```
pub fn format_seconds(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    // Include milliseconds only when present
    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(61.0), "00:01:01");
        assert_eq!(format_seconds(3723.0), "01:02:03");
    }

    #[test]
    fn test_fractional_seconds() {
        assert_eq!(format_seconds(1.25), "00:00:01.250");
    }

    #[test]
    fn test_negative_clamped() {
        assert_eq!(format_seconds(-5.0), "00:00:00");
    }
}
