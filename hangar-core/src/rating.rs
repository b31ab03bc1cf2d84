//! Rating formula and production-year helpers.
//!
//! Production dates travel as epoch milliseconds and are resolved to a
//! calendar year in UTC.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// The in-universe current year used by the rating formula.
pub const CURRENT_YEAR: i32 = 3019;

/// Round to two decimal places, half-up.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Compute the derived rating of a ship.
///
/// `rating = round2(80 * speed * k / (CURRENT_YEAR - year + 1))` where `k` is
/// `0.5` for used ships and `1` otherwise.
pub fn rating(speed: f64, year: i32, is_used: bool) -> f64 {
    let k = if is_used { 0.5 } else { 1.0 };
    round2(80.0 * speed * k / f64::from(CURRENT_YEAR - year + 1))
}

/// Resolve the UTC calendar year of an epoch-millisecond timestamp.
pub fn year_of_millis(millis: i64) -> Option<i32> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|at| at.year())
}

/// Epoch milliseconds of January 1st, 00:00:00 UTC of `year`.
pub fn start_of_year_millis(year: i32) -> Option<i64> {
    let midnight = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp_millis())
}

/// Normalize a timestamp to January 1st, 00:00:00 UTC of its year.
pub fn first_day_of_year(millis: i64) -> Option<i64> {
    year_of_millis(millis).and_then(start_of_year_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(0.124), 0.12);
        assert_eq!(round2(0.5), 0.5);
    }

    #[test]
    fn rating_for_new_ship() {
        assert_eq!(rating(0.5, 2805, false), 0.19);
    }

    #[test]
    fn rating_halves_for_used_ship() {
        assert_eq!(rating(0.5, 2805, true), 0.09);
    }

    #[test]
    fn rating_peaks_in_current_year() {
        assert_eq!(rating(0.99, CURRENT_YEAR, false), 79.2);
    }

    #[test]
    fn rating_is_reproducible() {
        let first = rating(0.37, 2950, true);
        let second = rating(0.37, 2950, true);
        assert_eq!(first, second);
    }

    #[test]
    fn first_day_of_year_normalizes_mid_year_timestamp() {
        let start = start_of_year_millis(2800).expect("start of 2800");
        let mid_year = start + 180 * 24 * 60 * 60 * 1000 + 12_345;
        assert_eq!(first_day_of_year(mid_year), Some(start));
        assert_eq!(year_of_millis(mid_year), Some(2800));
    }

    #[test]
    fn year_of_epoch_is_1970() {
        assert_eq!(year_of_millis(0), Some(1970));
        assert_eq!(start_of_year_millis(1970), Some(0));
    }
}
