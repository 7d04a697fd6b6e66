use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y/%m/%d",
];

/// Outcome of interpreting a publish-date signal.
///
/// `Degraded` is not a failure: the raw string is carried through unchanged
/// so downstream consumers still see whatever the page said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedDate {
    /// ISO-8601 rendering of a recognised format.
    Parsed(String),
    /// Unrecognised format; the original input.
    Degraded(String),
}

impl ParsedDate {
    pub fn into_value(self) -> String {
        match self {
            ParsedDate::Parsed(value) | ParsedDate::Degraded(value) => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ParsedDate::Degraded(_))
    }
}

/// Parse a date string found on a page or in an API payload.
///
/// Returns `None` only for empty input.
pub fn parse_date(raw: &str) -> Option<ParsedDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ParsedDate::Parsed(format_offset(&dt)));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(ParsedDate::Parsed(format_naive(&dt)));
        }
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(ParsedDate::Parsed(format_offset(&dt)));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Some(ParsedDate::Parsed(format_naive(&midnight)));
            }
        }
    }

    Some(ParsedDate::Degraded(raw.to_string()))
}

/// Convenience for optional signals: absent or empty input yields `None`,
/// anything else yields the parsed or raw value.
pub fn resolve_date(raw: Option<&str>) -> Option<String> {
    raw.and_then(parse_date).map(ParsedDate::into_value)
}

fn format_naive(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn format_offset(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string()
}
