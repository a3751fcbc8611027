//! Declared-duration parsing and tolerance checks

use crate::error::ValidationError;
use crate::types::ValidationResult;

/// Allowed deviation as a fraction of the declared duration
pub const DURATION_TOLERANCE_RATIO: f64 = 0.05;

/// Parse a declared duration (`SS`, `MM:SS` or `HH:MM:SS`) into seconds
///
/// Components may be fractional. A blank or zero duration means the feed did
/// not declare one and yields `Ok(None)`.
///
/// # Examples
///
/// ```
/// use podcast_dl::validation::parse_declared_duration;
///
/// assert_eq!(parse_declared_duration("10:00").unwrap(), Some(600.0));
/// assert_eq!(parse_declared_duration("1:02:03").unwrap(), Some(3723.0));
/// assert_eq!(parse_declared_duration("0").unwrap(), None);
/// ```
pub fn parse_declared_duration(raw: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let invalid = || ValidationError::InvalidDeclaredDuration(raw.to_string());

    let components = trimmed
        .split(':')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(invalid)
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let seconds = match components.as_slice() {
        [secs] => *secs,
        [mins, secs] => mins * 60.0 + secs,
        [hours, mins, secs] => hours * 3600.0 + mins * 60.0 + secs,
        _ => return Err(invalid()),
    };

    Ok(if seconds > 0.0 { Some(seconds) } else { None })
}

/// Allowed deviation for an expected duration
pub fn tolerance_for(expected_secs: f64) -> f64 {
    expected_secs * DURATION_TOLERANCE_RATIO
}

/// Compare an actual duration against an optional expected one
///
/// Without an expected duration the result is a pass with
/// [`ValidationResult::is_skipped`] set.
pub fn compare_durations(expected_secs: Option<f64>, actual_secs: f64) -> ValidationResult {
    let within_tolerance = match expected_secs {
        Some(expected) => (actual_secs - expected).abs() <= tolerance_for(expected),
        None => true,
    };

    ValidationResult {
        expected_secs,
        actual_secs,
        within_tolerance,
    }
}
