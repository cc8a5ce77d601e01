use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

// ── DateParser ────────────────────────────────────────────────────────────────

/// Parses calendar dates from the variety of formats found in sales exports.
pub struct DateParser;

impl DateParser {
    /// Attempt to parse a cell into a [`NaiveDate`].
    ///
    /// Returns `None` for empty cells and for anything no format matches;
    /// an unparsable date is a missing-date marker, never a load error.
    ///
    /// US month-first forms are tried before day-first forms because the
    /// superstore exports are US-formatted (`11/8/2016`); an unambiguous
    /// day-first value (`23/11/2016`) still parses via the later patterns.
    pub fn parse(cell: &str) -> Option<NaiveDate> {
        let cell = cell.trim();
        if cell.is_empty() {
            return None;
        }

        const DATE_FORMATS: &[&str] = &[
            "%m/%d/%Y",
            "%Y-%m-%d",
            "%d/%m/%Y",
            "%m-%d-%Y",
            "%d-%m-%Y",
            "%Y/%m/%d",
        ];

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(cell, fmt) {
                return Some(date);
            }
        }

        // Some exports carry a time component; keep the date part.
        const DATETIME_FORMATS: &[&str] = &[
            "%m/%d/%Y %H:%M:%S",
            "%m/%d/%Y %H:%M",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
        ];

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(cell, fmt) {
                return Some(dt.date());
            }
        }

        debug!("DateParser: could not parse date cell \"{}\"", cell);
        None
    }
}

// ── Month truncation ──────────────────────────────────────────────────────────

/// Truncate a date to the first day of its calendar month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── DateParser::parse ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_us_format() {
        assert_eq!(DateParser::parse("11/8/2016"), Some(date(2016, 11, 8)));
        assert_eq!(DateParser::parse("01/02/2017"), Some(date(2017, 1, 2)));
    }

    #[test]
    fn test_parse_iso_format() {
        assert_eq!(DateParser::parse("2016-11-08"), Some(date(2016, 11, 8)));
    }

    #[test]
    fn test_parse_day_first_when_unambiguous() {
        // Month 23 is impossible, so the day-first pattern wins.
        assert_eq!(DateParser::parse("23/11/2016"), Some(date(2016, 11, 23)));
    }

    #[test]
    fn test_parse_datetime_keeps_date_part() {
        assert_eq!(
            DateParser::parse("2016-11-08 14:30:00"),
            Some(date(2016, 11, 8))
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(DateParser::parse("  2016-11-08 "), Some(date(2016, 11, 8)));
    }

    #[test]
    fn test_parse_empty_and_garbage() {
        assert_eq!(DateParser::parse(""), None);
        assert_eq!(DateParser::parse("   "), None);
        assert_eq!(DateParser::parse("not a date"), None);
        assert_eq!(DateParser::parse("13/32/2016"), None);
    }

    // ── month_start ───────────────────────────────────────────────────────────

    #[test]
    fn test_month_start_truncates_day() {
        assert_eq!(month_start(date(2017, 6, 23)), date(2017, 6, 1));
    }

    #[test]
    fn test_month_start_idempotent() {
        let first = date(2017, 6, 1);
        assert_eq!(month_start(first), first);
    }
}
