//! ISO-8601 duration parsing for video lengths (`PT1M5S`, `P1DT2H`, ...).

use once_cell::sync::Lazy;
use regex_lite::Regex;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration regex is valid")
});

/// Parse an ISO-8601 duration into whole seconds.
///
/// Returns `None` for anything that is not a day/time duration or has no
/// components at all (`"P"`, `"PT"`).
pub fn parse_iso8601_duration(value: &str) -> Option<u32> {
    let caps = DURATION_RE.captures(value.trim())?;

    let mut any = false;
    let mut total: u64 = 0;
    for (idx, factor) in [(1, 86_400u64), (2, 3_600), (3, 60), (4, 1)] {
        if let Some(m) = caps.get(idx) {
            any = true;
            let n: u64 = m.as_str().parse().ok()?;
            total = total.checked_add(n.checked_mul(factor)?)?;
        }
    }

    if !any {
        return None;
    }
    u32::try_from(total).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds_only() {
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
    }

    #[test]
    fn test_parse_minutes_and_seconds() {
        assert_eq!(parse_iso8601_duration("PT1M5S"), Some(65));
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("PT2H"), Some(7200));
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_iso8601_duration("P1DT1S"), Some(86_401));
        assert_eq!(parse_iso8601_duration("P0D"), Some(0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("P"), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("1M5S"), None);
        assert_eq!(parse_iso8601_duration("PT1.5S"), None);
        assert_eq!(parse_iso8601_duration("P1W"), None);
    }
}
