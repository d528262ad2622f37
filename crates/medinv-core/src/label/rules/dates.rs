//! Expiry date normalization.
//!
//! The same normalizer runs on tokens found in label text and on whatever a
//! client submits as an expiry date, so both sides agree on one canonical
//! `YYYY-MM-DD` form.

use chrono::{Datelike, NaiveDate};

use super::patterns::{DATE_DMY, DATE_ISO, DATE_MY};
use crate::label::text::compact;

/// Smallest year a canonical date may carry.
pub const MIN_YEAR: i32 = 1000;
/// Largest year a canonical date may carry.
pub const MAX_YEAR: i32 = 9999;

/// Date normalizer for free-form date tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer;

impl DateNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a token into a calendar date.
    pub fn normalize(&self, raw: &str) -> Option<NaiveDate> {
        normalize_date(raw)
    }
}

/// Normalize a free-form date token.
///
/// Accepts `YYYY-MM-DD`, `D.M.Y` and `M.Y` (separators `.`, `/` or `-`,
/// two to four digit years). Month/year tokens resolve to the last day of
/// that month. Returns `None` for anything unparseable or not on the
/// calendar.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let value = compact(raw);
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = DATE_ISO.captures(&value) {
        let year: i32 = caps[1].parse().ok()?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        return calendar_date(year, caps[2].parse().ok()?, caps[3].parse().ok()?);
    }

    if let Some(caps) = DATE_DMY.captures(&value) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = resolve_year(caps[3].parse().ok()?)?;
        return calendar_date(year, month, day);
    }

    if let Some(caps) = DATE_MY.captures(&value) {
        let month: u32 = caps[1].parse().ok()?;
        let year = resolve_year(caps[2].parse().ok()?)?;
        if !(1..=12).contains(&month) {
            return None;
        }
        let day = last_day_of_month(year, month)?;
        return calendar_date(year, month, day);
    }

    None
}

/// Normalize a token straight to its canonical string form.
pub fn normalize_date_str(raw: &str) -> Option<String> {
    normalize_date(raw).map(|date| format_canonical(&date))
}

/// Resolve a parsed year value.
///
/// Four-digit years pass through, two-digit years land in 2000-2099.
pub fn resolve_year(value: u32) -> Option<i32> {
    let value = i32::try_from(value).ok()?;
    match value {
        MIN_YEAR..=MAX_YEAR => Some(value),
        0..=99 => Some(2000 + value),
        _ => None,
    }
}

/// Last calendar day of the given month, leap years included.
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|date| date.day())
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_canonical(date: &NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Render a date as `DD.MM.YYYY`.
pub fn format_display(date: &NaiveDate) -> String {
    format!("{:02}.{:02}.{:04}", date.day(), date.month(), date.year())
}

fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn norm(raw: &str) -> Option<String> {
        normalize_date_str(raw)
    }

    #[test]
    fn test_iso_passes_through() {
        assert_eq!(norm("2025-12-31"), Some("2025-12-31".to_string()));
        assert_eq!(norm("  2024-02-29 "), Some("2024-02-29".to_string()));
    }

    #[test]
    fn test_iso_is_calendar_checked() {
        assert_eq!(norm("2024-02-30"), None);
        assert_eq!(norm("2023-13-01"), None);
        assert_eq!(norm("0999-01-01"), None);
    }

    #[test]
    fn test_day_month_year() {
        assert_eq!(norm("15.01.2024"), Some("2024-01-15".to_string()));
        assert_eq!(norm("1/2/2024"), Some("2024-02-01".to_string()));
        assert_eq!(norm("01-02-24"), Some("2024-02-01".to_string()));
    }

    #[test]
    fn test_month_year_uses_last_day() {
        assert_eq!(norm("05/26"), Some("2026-05-31".to_string()));
        assert_eq!(norm("12/2025"), Some("2025-12-31".to_string()));
        assert_eq!(norm("04.2025"), Some("2025-04-30".to_string()));
        assert_eq!(norm("02/2024"), Some("2024-02-29".to_string()));
        assert_eq!(norm("02-2023"), Some("2023-02-28".to_string()));
    }

    #[test]
    fn test_two_digit_year_always_maps_into_2000s() {
        assert_eq!(norm("01.02.99"), Some("2099-02-01".to_string()));
        assert_eq!(norm("01.02.00"), Some("2000-02-01".to_string()));
    }

    #[test]
    fn test_calendar_rejection() {
        assert_eq!(norm("31.02.2024"), None);
        assert_eq!(norm("29.02.2023"), None);
        assert_eq!(norm("31.04.2025"), None);
        assert_eq!(norm("29.02.2024"), Some("2024-02-29".to_string()));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(norm(""), None);
        assert_eq!(norm("   "), None);
        assert_eq!(norm("not a date"), None);
        assert_eq!(norm("13/45/2024"), None);
        assert_eq!(norm("13/2025"), None);
        assert_eq!(norm("00/2025"), None);
        assert_eq!(norm("0.1.2025"), None);
        assert_eq!(norm("12 / 2025"), None);
        assert_eq!(norm("MHD 12/2025"), None);
    }

    #[test]
    fn test_three_digit_year_rejected() {
        assert_eq!(norm("01.01.123"), None);
        assert_eq!(norm("5/123"), None);
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        for raw in ["05/26", "29.02.2024", "1.1.2030", "12-2099", "2031-07-15"] {
            let first = norm(raw).unwrap();
            assert_eq!(norm(&first), Some(first.clone()), "token {raw}");
        }
    }

    #[test]
    fn test_resolve_year() {
        assert_eq!(resolve_year(26), Some(2026));
        assert_eq!(resolve_year(2026), Some(2026));
        assert_eq!(resolve_year(100), None);
        assert_eq!(resolve_year(999), None);
        assert_eq!(resolve_year(10000), None);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), Some(29));
        assert_eq!(last_day_of_month(1900, 2), Some(28));
        assert_eq!(last_day_of_month(2000, 2), Some(29));
        assert_eq!(last_day_of_month(2025, 12), Some(31));
        assert_eq!(last_day_of_month(2025, 11), Some(30));
    }

    #[test]
    fn test_display_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_display(&date), "07.03.2025");
        assert_eq!(format_canonical(&date), "2025-03-07");
    }
}
