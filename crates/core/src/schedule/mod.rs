//! Recurring operation schedule arithmetic.
//!
//! A recurring operation carries a frequency and a due day (1-31). After
//! each execution its next due date advances by exactly one frequency
//! period, landing on the due day. When the target month is shorter than
//! the due day, the date is clamped to that month's last valid day; the
//! due day itself is kept, so a day-31 schedule lands on Feb 28 and then
//! Mar 31, never drifting to 28 permanently.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// How often a recurring operation executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every month.
    Monthly,
    /// Every three months.
    Quarterly,
    /// Every year.
    Yearly,
}

impl Frequency {
    /// Number of months in one period.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
        }
    }
}

/// Number of days in the given month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    // The first of the following month minus one day.
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(28, |d| d.day())
}

/// Advances a due date by one frequency period, landing on `due_day`.
///
/// The due day is clamped to the last valid day of the target month when
/// the month is shorter. The result is always strictly after `basis` for
/// any `due_day` in 1-31.
#[must_use]
pub fn advance_due_date(basis: NaiveDate, frequency: Frequency, due_day: u32) -> NaiveDate {
    let total_months =
        i64::from(basis.year()) * 12 + i64::from(basis.month0()) + i64::from(frequency.months());

    #[allow(clippy::cast_possible_truncation)]
    let year = (total_months.div_euclid(12)) as i32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let month = (total_months.rem_euclid(12)) as u32 + 1;

    let day = due_day.clamp(1, days_in_month(year, month));

    // Day is clamped into the month's valid range, so this cannot fail.
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("clamped day {day} invalid for {year}-{month:02}"))
}

/// Returns true if an operation with the given next due date is due.
#[must_use]
pub fn is_due(next_due_date: NaiveDate, today: NaiveDate) -> bool {
    next_due_date <= today
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_monthly_advance_plain() {
        assert_eq!(
            advance_due_date(date(2026, 3, 15), Frequency::Monthly, 15),
            date(2026, 4, 15)
        );
    }

    #[test]
    fn test_monthly_day_31_clamps_to_short_month() {
        // Day-31 schedule into a 30-day month lands on the 30th.
        assert_eq!(
            advance_due_date(date(2026, 3, 31), Frequency::Monthly, 31),
            date(2026, 4, 30)
        );
        // And into February, on the 28th.
        assert_eq!(
            advance_due_date(date(2026, 1, 31), Frequency::Monthly, 31),
            date(2026, 2, 28)
        );
    }

    #[test]
    fn test_clamped_schedule_recovers_due_day() {
        // Feb 28 with due_day 31 still lands on Mar 31: clamping never
        // rewrites the due day itself.
        assert_eq!(
            advance_due_date(date(2026, 2, 28), Frequency::Monthly, 31),
            date(2026, 3, 31)
        );
    }

    #[test]
    fn test_leap_year_february() {
        assert_eq!(
            advance_due_date(date(2028, 1, 31), Frequency::Monthly, 31),
            date(2028, 2, 29)
        );
    }

    #[test]
    fn test_quarterly_advance() {
        assert_eq!(
            advance_due_date(date(2026, 11, 30), Frequency::Quarterly, 30),
            date(2027, 2, 28)
        );
    }

    #[test]
    fn test_yearly_advance() {
        assert_eq!(
            advance_due_date(date(2026, 6, 10), Frequency::Yearly, 10),
            date(2027, 6, 10)
        );
    }

    #[test]
    fn test_year_rollover() {
        assert_eq!(
            advance_due_date(date(2026, 12, 5), Frequency::Monthly, 5),
            date(2027, 1, 5)
        );
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 1), 31);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_is_due() {
        assert!(is_due(date(2026, 8, 1), date(2026, 8, 23)));
        assert!(is_due(date(2026, 8, 23), date(2026, 8, 23)));
        assert!(!is_due(date(2026, 8, 24), date(2026, 8, 23)));
    }

    fn frequency_strategy() -> impl Strategy<Value = Frequency> {
        prop_oneof![
            Just(Frequency::Monthly),
            Just(Frequency::Quarterly),
            Just(Frequency::Yearly),
        ]
    }

    fn basis_strategy() -> impl Strategy<Value = NaiveDate> {
        (2020i32..2035, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        /// The advanced date is always strictly after the basis.
        #[test]
        fn prop_advance_strictly_later(
            basis in basis_strategy(),
            frequency in frequency_strategy(),
            due_day in 1u32..=31,
        ) {
            let next = advance_due_date(basis, frequency, due_day);
            prop_assert!(next > basis);
        }

        /// The advanced date lands on the due day, or on the last day of
        /// the target month when it is shorter.
        #[test]
        fn prop_advance_lands_on_due_day_or_clamped(
            basis in basis_strategy(),
            frequency in frequency_strategy(),
            due_day in 1u32..=31,
        ) {
            let next = advance_due_date(basis, frequency, due_day);
            let last_day = days_in_month(next.year(), next.month());
            if due_day <= last_day {
                prop_assert_eq!(next.day(), due_day);
            } else {
                prop_assert_eq!(next.day(), last_day);
            }
        }

        /// Advancing moves forward by exactly one frequency period in
        /// calendar months.
        #[test]
        fn prop_advance_period_width(
            basis in basis_strategy(),
            frequency in frequency_strategy(),
            due_day in 1u32..=31,
        ) {
            let next = advance_due_date(basis, frequency, due_day);
            let month_delta = (i64::from(next.year()) * 12 + i64::from(next.month0()))
                - (i64::from(basis.year()) * 12 + i64::from(basis.month0()));
            prop_assert_eq!(month_delta, i64::from(frequency.months()));
        }
    }
}
