//! Conversion between calendar dates and epoch-millisecond timestamps.
//!
//! Records store millis; every day boundary is the local midnight of the
//! calendar date, so a day spans `[start_of_day(d), start_of_day(d + 1))`.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

#[must_use]
pub fn now_millis() -> i64 {
    Local::now().timestamp_millis()
}

#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// First instant of `date` in the local time zone.
#[must_use]
pub fn start_of_day_millis(date: NaiveDate) -> i64 {
    start_of_day_in(&Local, date)
}

/// Half-open millis range covering `date`.
#[must_use]
pub fn day_bounds(date: NaiveDate) -> (i64, i64) {
    day_bounds_in(&Local, date)
}

/// Local calendar date containing the instant `millis`.
#[must_use]
pub fn millis_to_date(millis: i64) -> NaiveDate {
    millis_to_date_in(&Local, millis)
}

pub fn start_of_day_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    // Midnight can fall in a DST gap; the first valid hour is then the start.
    (0..24)
        .find_map(|hour| {
            tz.from_local_datetime(&(midnight + chrono::Duration::hours(hour)))
                .earliest()
        })
        .map_or_else(
            || midnight.and_utc().timestamp_millis(),
            |dt| dt.timestamp_millis(),
        )
}

pub fn day_bounds_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> (i64, i64) {
    let next = date.succ_opt().unwrap_or(date);
    (start_of_day_in(tz, date), start_of_day_in(tz, next))
}

pub fn millis_to_date_in<Tz: TimeZone>(tz: &Tz, millis: i64) -> NaiveDate {
    match tz.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.date_naive(),
        None => DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.date_naive())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_start_of_day_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(start_of_day_in(&Utc, date), 1_705_276_800_000);
    }

    #[test]
    fn test_day_bounds_span_one_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (start, end) = day_bounds_in(&Utc, date);
        assert_eq!(end - start, 86_400_000);
    }

    #[test]
    fn test_offset_zone_shifts_boundary() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            start_of_day_in(&tz, date),
            start_of_day_in(&Utc, date) - 2 * 3_600_000
        );
    }

    #[test]
    fn test_millis_to_date_round_trip() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let (start, end) = day_bounds_in(&tz, date);
        assert_eq!(millis_to_date_in(&tz, start), date);
        assert_eq!(millis_to_date_in(&tz, end - 1), date);
        assert_eq!(millis_to_date_in(&tz, end), date.succ_opt().unwrap());
    }

    #[test]
    fn test_local_helpers_agree() {
        let date = today();
        let (start, end) = day_bounds(date);
        assert_eq!(start, start_of_day_millis(date));
        assert!(start < end);
        assert_eq!(millis_to_date(start), date);
    }
}
