//! Next-occurrence calculation for allowance schedules.
//!
//! Every rule is a pure function of the schedule, a base date and a reference
//! ("as of") date:
//!
//! - **Daily**: the day after the reference date. The base date is ignored.
//! - **Weekly**: the next date strictly after the base date falling on the
//!   target weekday, at most seven days later.
//! - **Biweekly**: payments fall on the 1st and 3rd occurrence of the target
//!   weekday in a month. The earliest of those strictly after the reference
//!   date is returned, looking into the following month if needed.
//! - **Monthly**: the target day in the base date's month if it is still
//!   ahead, otherwise the target day of the following month, clamped to that
//!   month's length.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::domain::models::{CanonicalSchedule, Frequency, ScheduleError};
use crate::domain::schedule_normalizer::normalize;

impl CanonicalSchedule {
    /// Compute the next payment date for this schedule
    pub fn next_occurrence(
        &self,
        base_date: NaiveDate,
        reference_date: NaiveDate,
    ) -> Result<NaiveDate, ScheduleError> {
        match self {
            CanonicalSchedule::Daily => next_daily(reference_date),
            CanonicalSchedule::Weekly(token) => next_weekly(token.resolve()?, base_date),
            CanonicalSchedule::Biweekly(token) => next_biweekly(token.resolve()?, reference_date),
            CanonicalSchedule::Monthly(day) => next_monthly(*day, base_date),
        }
    }
}

/// Compute the next payment date straight from raw schedule strings.
///
/// Fails with `UnsupportedFrequency` for a frequency outside the four classes,
/// and with whatever the normalizer or calculator reports otherwise.
pub fn next_payment_date(
    frequency: &str,
    raw_day: &str,
    base_date: NaiveDate,
    reference_date: NaiveDate,
) -> Result<NaiveDate, ScheduleError> {
    frequency.parse::<Frequency>()?;
    normalize(frequency, raw_day)?.next_occurrence(base_date, reference_date)
}

fn next_daily(reference_date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    reference_date
        .succ_opt()
        .ok_or(ScheduleError::DateOutOfRange(reference_date))
}

fn next_weekly(target: Weekday, base_date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    let target_idx = target.num_days_from_monday();
    let base_idx = base_date.weekday().num_days_from_monday();
    let days_ahead = match (target_idx + 7 - base_idx) % 7 {
        0 => 7,
        n => n,
    };
    base_date
        .checked_add_days(Days::new(u64::from(days_ahead)))
        .ok_or(ScheduleError::DateOutOfRange(base_date))
}

fn next_biweekly(target: Weekday, reference_date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    let (year, month) = (reference_date.year(), reference_date.month());
    if let Some(date) = biweekly_dates(year, month, target)
        .into_iter()
        .find(|date| *date > reference_date)
    {
        return Ok(date);
    }

    let (next_year, next_month) = following_month(year, month);
    biweekly_dates(next_year, next_month, target)
        .into_iter()
        .next()
        .ok_or(ScheduleError::NoValidOccurrence {
            year: next_year,
            month: next_month,
        })
}

fn next_monthly(target_day: u32, base_date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    if target_day == 0 {
        return Err(ScheduleError::InvalidMonthDay(target_day));
    }

    let (year, month) = (base_date.year(), base_date.month());
    let last_day = days_in_month(year, month);

    if base_date.day() < target_day && target_day <= last_day {
        return NaiveDate::from_ymd_opt(year, month, target_day)
            .ok_or(ScheduleError::DateOutOfRange(base_date));
    }

    let (next_year, next_month) = following_month(year, month);
    let day = target_day.min(days_in_month(next_year, next_month));
    NaiveDate::from_ymd_opt(next_year, next_month, day).ok_or(ScheduleError::DateOutOfRange(base_date))
}

/// The 1st and, when it exists, the 3rd occurrence of `weekday` in a month
pub fn biweekly_dates(year: i32, month: u32, weekday: Weekday) -> Vec<NaiveDate> {
    let occurrences: Vec<NaiveDate> = (1..=days_in_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|date| date.weekday() == weekday)
        .collect();

    [occurrences.first(), occurrences.get(2)]
        .into_iter()
        .flatten()
        .copied()
        .collect()
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn following_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
