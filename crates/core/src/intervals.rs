//! Calendar interval arithmetic.
//!
//! Both functions work on calendar fields only. `calculate_months` deliberately ignores the
//! day of month: 2020-01-31 to 2020-02-01 is one month, 2020-01-01 to 2020-01-31 is zero.
//! Registry rows written by earlier tooling were computed this way and new rows must agree.

use chrono::{Datelike, NaiveDate};

/// Whole months from `start` to `end`, counting month boundaries only.
///
/// Returns a negative count when `end` precedes `start`.
pub fn calculate_months(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32)
}

/// Whole years elapsed between `birth_date` and `today`.
///
/// One year is subtracted while this year's birthday has not yet been reached.
pub fn calculate_age(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years - 1
    } else {
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn months_counts_calendar_boundaries() {
        assert_eq!(calculate_months(date(2020, 1, 15), date(2021, 3, 1)), 14);
    }

    #[test]
    fn months_ignores_day_of_month() {
        assert_eq!(
            calculate_months(date(2022, 5, 1), date(2022, 8, 1)),
            calculate_months(date(2022, 5, 28), date(2022, 8, 1))
        );
        assert_eq!(calculate_months(date(2020, 1, 31), date(2020, 2, 1)), 1);
        assert_eq!(calculate_months(date(2020, 1, 1), date(2020, 1, 31)), 0);
    }

    #[test]
    fn months_can_be_negative() {
        assert_eq!(calculate_months(date(2021, 3, 1), date(2020, 1, 15)), -14);
    }

    #[test]
    fn months_swap_negates_for_any_dates() {
        // The formula uses year and month only, so swapping arguments negates the result
        // even when the days differ. What does not hold is agreement with elapsed time:
        // both of these spans are 14 "months" although one is ~13.5 months long.
        let a = date(2020, 1, 15);
        let b = date(2021, 3, 1);
        assert_eq!(calculate_months(a, b), -calculate_months(b, a));
        assert_eq!(
            calculate_months(date(2020, 1, 1), date(2021, 3, 31)),
            calculate_months(a, b)
        );
    }

    #[test]
    fn months_is_not_elapsed_months() {
        // One day apart across a month boundary still counts as a month.
        let start = date(2023, 6, 30);
        let end = date(2023, 7, 1);
        assert_eq!((end - start).num_days(), 1);
        assert_eq!(calculate_months(start, end), 1);
    }

    #[test]
    fn age_before_birthday() {
        assert_eq!(calculate_age(date(2000, 6, 15), date(2024, 6, 14)), 23);
    }

    #[test]
    fn age_on_and_after_birthday() {
        assert_eq!(calculate_age(date(2000, 6, 15), date(2024, 6, 15)), 24);
        assert_eq!(calculate_age(date(2000, 6, 15), date(2024, 12, 1)), 24);
    }

    #[test]
    fn age_leap_day_birthday() {
        assert_eq!(calculate_age(date(2000, 2, 29), date(2023, 2, 28)), 22);
        assert_eq!(calculate_age(date(2000, 2, 29), date(2023, 3, 1)), 23);
    }
}
