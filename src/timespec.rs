use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::AppError;

/// Parse a user-facing time spec into unix seconds (UTC).
///
/// Accepted forms:
/// - `"now"`
/// - `"-Nd"` for N days before now (`"-60d"`)
/// - RFC 3339 (`"2025-06-01T12:00:00Z"`, offsets honoured)
/// - `"YYYY-MM-DD HH:MM:SS"` / `"YYYY-MM-DDTHH:MM:SS"` (assumed UTC)
/// - `"YYYY-MM-DD"` (midnight UTC)
pub fn parse_time_spec(spec: &str) -> Result<i64, AppError> {
    parse_time_spec_at(spec, Utc::now())
}

/// Same as [`parse_time_spec`] with an injectable "now" so the relative
/// forms stay deterministic under test.
pub fn parse_time_spec_at(spec: &str, now: DateTime<Utc>) -> Result<i64, AppError> {
    let trimmed = spec.trim();
    let lowered = trimmed.to_ascii_lowercase();

    if lowered == "now" {
        return Ok(now.timestamp());
    }

    if let Some(rest) = lowered.strip_prefix('-') {
        if let Some(days_str) = rest.strip_suffix('d') {
            let days: i64 = days_str.parse().map_err(|_| AppError::InvalidTimeSpec {
                spec: spec.to_string(),
                reason: "day count must be a positive integer".to_string(),
            })?;
            if days < 0 {
                return Err(AppError::InvalidTimeSpec {
                    spec: spec.to_string(),
                    reason: "day count must be a positive integer".to_string(),
                });
            }
            return Ok((now - chrono::Duration::days(days)).timestamp());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).timestamp());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(Utc.from_utc_datetime(&naive).timestamp());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0).expect("midnight is valid");
        return Ok(Utc.from_utc_datetime(&naive).timestamp());
    }

    Err(AppError::InvalidTimeSpec {
        spec: spec.to_string(),
        reason: "expected 'now', '-Nd', or an absolute date/time".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn now_sentinel_resolves_to_current_time() {
        assert_eq!(
            parse_time_spec_at("now", fixed_now()).unwrap(),
            fixed_now().timestamp()
        );
        // case-insensitive, whitespace-tolerant
        assert_eq!(
            parse_time_spec_at(" NOW ", fixed_now()).unwrap(),
            fixed_now().timestamp()
        );
    }

    #[test]
    fn relative_days_subtract_from_now() {
        let expected = fixed_now().timestamp() - 60 * 86_400;
        assert_eq!(parse_time_spec_at("-60d", fixed_now()).unwrap(), expected);
    }

    #[test]
    fn absolute_forms_resolve_to_utc() {
        let ts = parse_time_spec_at("2025-06-01", fixed_now()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap().timestamp());

        let ts = parse_time_spec_at("2025-06-01 08:30:00", fixed_now()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap().timestamp());

        // RFC 3339 offset is normalised to UTC
        let ts = parse_time_spec_at("2025-06-01T08:30:00+02:00", fixed_now()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 1, 6, 30, 0).unwrap().timestamp());
    }

    #[test]
    fn unparsable_specs_are_rejected() {
        for bad in ["", "yesterday", "-60x", "-d", "06/01/2025"] {
            let err = parse_time_spec_at(bad, fixed_now()).unwrap_err();
            assert!(matches!(err, AppError::InvalidTimeSpec { .. }), "{bad}");
        }
    }
}
