//! Dismissal Evaluation
//!
//! Decides whether an alert is currently dismissed from the raw `dismissed`
//! flag and the optional `dismissUntil` expiry.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::ModelError;

/// Sentinel meaning "dismissed with no expiry"
pub const DISMISS_FOREVER: &str = "forever";

/// Shape of `dismissUntil`; `9` stands for any ASCII digit
const DISMISS_UNTIL_TEMPLATE: &[u8] = b"9999-99-99T99:99:99.999999Z";
const DISMISS_UNTIL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Raw `dismissed` input as delivered by a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissedFlag<'a> {
    Bool(bool),
    Text(&'a str),
}

impl<'a> DismissedFlag<'a> {
    /// Interpret a JSON value; `null` is treated as not dismissed
    pub fn from_value(value: &'a Value) -> Result<Self, ModelError> {
        match value {
            Value::Bool(b) => Ok(DismissedFlag::Bool(*b)),
            Value::String(s) => Ok(DismissedFlag::Text(s)),
            Value::Null => Ok(DismissedFlag::Bool(false)),
            other => Err(ModelError::InvalidField {
                field: "dismissed".to_string(),
                value: other.to_string(),
                reason: "expected a boolean or a string".to_string(),
            }),
        }
    }

    /// Only the string "true" (any case) counts as set
    pub fn is_set(self) -> bool {
        match self {
            DismissedFlag::Bool(b) => b,
            DismissedFlag::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

impl From<bool> for DismissedFlag<'_> {
    fn from(b: bool) -> Self {
        DismissedFlag::Bool(b)
    }
}

impl<'a> From<&'a str> for DismissedFlag<'a> {
    fn from(s: &'a str) -> Self {
        DismissedFlag::Text(s)
    }
}

/// Resolve the effective dismissal state at `now`.
///
/// The flag wins outright when unset. A set flag with no expiry (absent,
/// empty, or `"forever"`) is a permanent dismissal; otherwise the dismissal
/// holds strictly before the expiry instant.
pub fn resolve(
    dismissed: DismissedFlag<'_>,
    dismiss_until: Option<&str>,
    now: DateTime<Utc>,
) -> Result<bool, ModelError> {
    if !dismissed.is_set() {
        return Ok(false);
    }

    match dismiss_until {
        None => Ok(true),
        Some(until) if until.is_empty() || until == DISMISS_FOREVER => Ok(true),
        Some(until) => Ok(now < parse_dismiss_until(until)?),
    }
}

/// Parse a dismiss-until timestamp of the exact form `YYYY-MM-DDTHH:MM:SS.ffffffZ`
pub fn parse_dismiss_until(value: &str) -> Result<DateTime<Utc>, ModelError> {
    let invalid = || ModelError::InvalidDismissUntil {
        value: value.to_string(),
    };

    if !matches_template(value.as_bytes()) {
        return Err(invalid());
    }

    NaiveDateTime::parse_from_str(value, DISMISS_UNTIL_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid())
}

fn matches_template(bytes: &[u8]) -> bool {
    bytes.len() == DISMISS_UNTIL_TEMPLATE.len()
        && bytes
            .iter()
            .zip(DISMISS_UNTIL_TEMPLATE)
            .all(|(&b, &t)| match t {
                b'9' => b.is_ascii_digit(),
                literal => b == literal,
            })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_flag_normalization() {
        assert!(DismissedFlag::from("true").is_set());
        assert!(DismissedFlag::from("TRUE").is_set());
        assert!(!DismissedFlag::from("yes").is_set());
        assert!(!DismissedFlag::from("").is_set());
        assert!(DismissedFlag::from(true).is_set());
        assert!(!DismissedFlag::from(false).is_set());
    }

    #[test]
    fn test_flag_from_value() {
        assert_eq!(DismissedFlag::from_value(&json!(null)).unwrap(), DismissedFlag::Bool(false));
        assert_eq!(DismissedFlag::from_value(&json!("True")).unwrap(), DismissedFlag::Text("True"));
        assert!(DismissedFlag::from_value(&json!(1)).is_err());
    }

    #[test]
    fn test_not_dismissed_ignores_until() {
        // A malformed expiry is irrelevant when the flag is unset
        assert!(!resolve(false.into(), Some("garbage"), now()).unwrap());
        assert!(!resolve("false".into(), Some("2099-01-01T00:00:00.000000Z"), now()).unwrap());
    }

    #[test]
    fn test_permanent_dismissal() {
        assert!(resolve(true.into(), None, now()).unwrap());
        assert!(resolve(true.into(), Some(""), now()).unwrap());
        assert!(resolve("true".into(), Some("forever"), now()).unwrap());
    }

    #[test]
    fn test_expiry_in_future_and_past() {
        assert!(resolve(true.into(), Some("2099-01-01T00:00:00.000000Z"), now()).unwrap());
        assert!(!resolve(true.into(), Some("2000-01-01T00:00:00.000000Z"), now()).unwrap());
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let until = "2024-06-01T12:00:00.000000Z";
        assert!(!resolve(true.into(), Some(until), now()).unwrap());
        assert!(resolve(true.into(), Some("2024-06-01T12:00:00.000001Z"), now()).unwrap());
    }

    #[test]
    fn test_strict_format() {
        for bad in [
            "2099-01-01T00:00:00Z",
            "2099-01-01T00:00:00.000Z",
            "2099-01-01T00:00:00.000000+00:00",
            "2099-01-01 00:00:00.000000Z",
            "2099-13-01T00:00:00.000000Z",
            "tomorrow",
        ] {
            assert_eq!(
                resolve(true.into(), Some(bad), now()),
                Err(ModelError::InvalidDismissUntil { value: bad.to_string() }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_keeps_microseconds() {
        let parsed = parse_dismiss_until("2030-02-03T04:05:06.123456Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_micros(), 123456);
    }
}
