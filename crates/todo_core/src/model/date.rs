//! Calendar date text format shared by storage and serde.
//!
//! Due dates are stored and exchanged as `YYYY-MM-DD`. Blank input means
//! "no due date".

use time::macros::format_description;
use time::Date;

/// Parses a `YYYY-MM-DD` date.
///
/// A trailing time component (`2024-05-01T08:00:00`) is ignored, since only
/// the calendar day is meaningful for due dates.
pub fn parse_date(value: &str) -> Option<Date> {
    let trimmed = value.trim();
    let day_part = match trimmed.get(..10) {
        Some(prefix) if trimmed.len() > 10 => {
            let separator = trimmed.as_bytes()[10];
            if separator != b'T' && separator != b' ' {
                return None;
            }
            prefix
        }
        _ => trimmed,
    };
    Date::parse(day_part, format_description!("[year]-[month]-[day]")).ok()
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Serde adapter for `Option<Date>` fields.
///
/// `null` and `""` both deserialize to `None`.
pub(crate) mod optional {
    use super::{format_date, parse_date};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_date(value).map(Some).ok_or_else(|| {
                D::Error::custom(format!("invalid date `{value}`, expected YYYY-MM-DD"))
            }),
        }
    }
}

/// Serde adapter for patch fields where absence and `null` differ.
///
/// Used with `#[serde(default)]`: a missing key stays `None` (unchanged),
/// while a present key yields `Some(..)`, with `null`/`""` meaning "clear".
pub(crate) mod patch {
    use serde::Deserializer;
    use time::Date;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<Date>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::optional::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_date};
    use time::macros::date;

    #[test]
    fn parse_accepts_plain_and_timestamped_dates() {
        assert_eq!(parse_date("2024-03-09"), Some(date!(2024 - 03 - 09)));
        assert_eq!(
            parse_date(" 2024-03-09T10:30:00Z "),
            Some(date!(2024 - 03 - 09))
        );
        assert_eq!(parse_date("2024-03-09 10:30"), Some(date!(2024 - 03 - 09)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("tomorrow"), None);
        assert_eq!(parse_date("2024-03-09x"), None);
    }

    #[test]
    fn format_pads_components() {
        assert_eq!(format_date(date!(2025 - 01 - 05)), "2025-01-05");
    }
}
