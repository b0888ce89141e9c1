//! Lenient parsing of document dates.
//!
//! Handles the shapes that show up in document metadata: RFC 3339, plain ISO
//! dates and date-times, bare years (audio tags) and PDF date strings such as
//! `D:20240131120000+01'00'`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static PDF_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^D:(\d{4})(\d{2})?(\d{2})?(\d{2})?(\d{2})?(\d{2})?(Z|[+-]\d{2}'?\d{2}'?|[+-]\d{2})?",
    )
    .unwrap()
});

/// Parse a metadata date string into UTC. Returns `None` for anything
/// unrecognised.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if value.starts_with("D:") {
        return parse_pdf_date(value);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }

    if value.len() == 4 {
        if let Ok(year) = value.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| Utc.from_utc_datetime(&n));
        }
    }

    None
}

fn parse_pdf_date(value: &str) -> Option<DateTime<Utc>> {
    let caps = PDF_DATE.captures(value)?;
    let part = |idx: usize, default: u32| -> u32 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(default)
    };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, part(2, 1), part(3, 1))?
        .and_hms_opt(part(4, 0), part(5, 0), part(6, 0))?;

    let offset_seconds = match caps.get(7).map(|m| m.as_str()) {
        None | Some("Z") => 0,
        Some(tz) => {
            let sign = if tz.starts_with('-') { -1 } else { 1 };
            let digits: String = tz.chars().filter(|c| c.is_ascii_digit()).collect();
            let hours: i32 = digits.get(0..2)?.parse().ok()?;
            let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
            sign * (hours * 3600 + minutes * 60)
        }
    };

    let offset = FixedOffset::east_opt(offset_seconds)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use chrono::Timelike;

    #[test]
    fn test_rfc3339() {
        let dt = parse_date("2012-05-04T10:20:30+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.day(), 4);
    }

    #[test]
    fn test_plain_date_and_year() {
        let dt = parse_date("2011-02-21").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2011, 2, 21));

        let year = parse_date("2004").unwrap();
        assert_eq!((year.year(), year.month(), year.day()), (2004, 1, 1));
    }

    #[test]
    fn test_pdf_dates() {
        let utc = parse_date("D:20240131120000Z").unwrap();
        assert_eq!((utc.year(), utc.month(), utc.day(), utc.hour()), (2024, 1, 31, 12));

        let offset = parse_date("D:20240131120000+01'00'").unwrap();
        assert_eq!(offset.hour(), 11);

        let short = parse_date("D:2019").unwrap();
        assert_eq!((short.year(), short.month()), (2019, 1));
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(parse_date("").is_none());
        assert!(parse_date("last tuesday").is_none());
        assert!(parse_date("D:notadate").is_none());
    }
}
