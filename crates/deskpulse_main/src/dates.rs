use chrono::{Days, NaiveDate, NaiveTime, TimeZone};
use deskpulse_domain::{Error, Result};

use crate::cli::Period;

const DEFAULT_SPAN_DAYS: u64 = 7;

/// Resolves `period` against `today`, filling a missing end with today and a
/// missing start with a week before the end.
pub fn resolve(period: &Period, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let to = period.to.unwrap_or(today);
    let from = period
        .from
        .unwrap_or_else(|| to.checked_sub_days(Days::new(DEFAULT_SPAN_DAYS)).unwrap_or(to));
    (from, to)
}

/// Epoch seconds spanning `from` 00:00:00 to `to` 23:59:59 in `tz`.
pub fn day_window<Tz: TimeZone>(from: NaiveDate, to: NaiveDate, tz: &Tz) -> Result<(i64, i64)> {
    if from > to {
        return Err(Error::InvalidDateRange { start: from, end: to });
    }

    let start = from.and_time(NaiveTime::default());
    let end = to.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default());

    let start = tz
        .from_local_datetime(&start)
        .earliest()
        .ok_or(Error::AmbiguousLocalTime(start))?;
    let end = tz
        .from_local_datetime(&end)
        .latest()
        .ok_or(Error::AmbiguousLocalTime(end))?;

    Ok((start.timestamp(), end.timestamp()))
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_in_utc() {
        let actual = day_window(date(2023, 11, 14), date(2023, 11, 14), &Utc).unwrap();
        assert_eq!(actual, (1_699_920_000, 1_700_006_399));
    }

    #[test]
    fn test_window_follows_offset() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let actual = day_window(date(2023, 11, 14), date(2023, 11, 15), &tz).unwrap();
        assert_eq!(actual, (1_699_930_800, 1_700_103_599));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let actual = day_window(date(2024, 1, 2), date(2024, 1, 1), &Utc);
        assert!(matches!(actual, Err(Error::InvalidDateRange { .. })));
    }

    #[test]
    fn test_resolve_defaults() {
        let today = date(2024, 3, 10);

        assert_eq!(resolve(&Period::default(), today), (date(2024, 3, 3), today));

        let fixture = Period { from: Some(date(2024, 1, 1)), to: None };
        assert_eq!(resolve(&fixture, today), (date(2024, 1, 1), today));

        let fixture = Period { from: None, to: Some(date(2024, 2, 10)) };
        assert_eq!(resolve(&fixture, today), (date(2024, 2, 3), date(2024, 2, 10)));
    }
}
