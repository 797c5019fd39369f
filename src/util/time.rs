use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a timestamp as sent by the API.
///
/// The service emits ISO-8601 strings, sometimes with an offset
/// (`2024-05-01T12:00:00Z`) and sometimes naive (`2024-05-01T12:00:00.123456`),
/// which is read as UTC. Bare dates are accepted as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Compact relative age ("5m", "3h", "2d"), falling back to a short date
/// after a week. Future timestamps read as "now".
pub fn format_relative_time(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = ts else {
        return String::new();
    };
    let diff = (now - ts).num_seconds();
    match diff {
        d if d < 60 => "now".to_string(),
        d if d < 3_600 => format!("{}m", d / 60),
        d if d < 86_400 => format!("{}h", d / 3_600),
        d if d < 604_800 => format!("{}d", d / 86_400),
        _ => ts.format("%b %d").to_string(),
    }
}

/// Long form date for the reader header, e.g. "May 01, 2024".
pub fn format_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%b %d, %Y").to_string())
        .unwrap_or_default()
}
