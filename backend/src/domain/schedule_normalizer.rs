//! Turns a raw `(frequency, scheduled day)` pair into a `CanonicalSchedule`.
//!
//! Monthly days accept the named forms `1st`/`first_day` and
//! `15th`/`fifteenth_day`, otherwise the first run of digits in the string.
//! Weekly and biweekly days are lower-cased and checked later, when the next
//! occurrence is computed. Daily schedules ignore the day entirely.

use crate::domain::models::{CanonicalSchedule, Frequency, ScheduleError, WeekdayToken};

pub fn normalize(frequency: &str, raw_day: &str) -> Result<CanonicalSchedule, ScheduleError> {
    let unrecognized = || ScheduleError::UnrecognizedSchedule {
        frequency: frequency.to_string(),
        day: raw_day.to_string(),
    };

    let frequency = frequency.parse::<Frequency>().map_err(|_| unrecognized())?;

    match frequency {
        Frequency::Monthly => {
            let day = raw_day.trim().to_lowercase();
            match day.as_str() {
                "1st" | "first_day" => Ok(CanonicalSchedule::Monthly(1)),
                "15th" | "fifteenth_day" => Ok(CanonicalSchedule::Monthly(15)),
                other => first_digit_run(other)
                    .and_then(|digits| digits.parse::<u32>().ok())
                    .map(CanonicalSchedule::Monthly)
                    .ok_or_else(unrecognized),
            }
        }
        Frequency::Weekly => Ok(CanonicalSchedule::Weekly(WeekdayToken::new(raw_day))),
        Frequency::Biweekly => Ok(CanonicalSchedule::Biweekly(WeekdayToken::new(raw_day))),
        Frequency::Daily => Ok(CanonicalSchedule::Daily),
    }
}

fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
