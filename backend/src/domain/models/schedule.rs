//! Domain model for allowance schedules: the frequency classes, the canonical
//! schedule produced by the normalizer, and the errors raised while
//! normalizing or computing one.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised while normalizing a schedule or computing its next occurrence
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Unrecognized schedule: frequency '{frequency}', day '{day}'")]
    UnrecognizedSchedule { frequency: String, day: String },
    #[error("Invalid weekday '{0}'")]
    InvalidWeekday(String),
    #[error("No valid biweekly payment date found in {year}-{month:02}")]
    NoValidOccurrence { year: i32, month: u32 },
    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),
    #[error("Day {0} cannot be used as a day of the month")]
    InvalidMonthDay(u32),
    #[error("Next occurrence after {0} is outside the supported date range")]
    DateOutOfRange(chrono::NaiveDate),
}

/// Recurrence class of an allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(ScheduleError::UnsupportedFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased weekday name as reported by the user.
///
/// The token is not checked when it is created; `resolve` fails for anything
/// other than the seven English weekday names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeekdayToken(String);

impl WeekdayToken {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resolve(&self) -> Result<Weekday, ScheduleError> {
        match self.0.as_str() {
            "monday" => Ok(Weekday::Mon),
            "tuesday" => Ok(Weekday::Tue),
            "wednesday" => Ok(Weekday::Wed),
            "thursday" => Ok(Weekday::Thu),
            "friday" => Ok(Weekday::Fri),
            "saturday" => Ok(Weekday::Sat),
            "sunday" => Ok(Weekday::Sun),
            _ => Err(ScheduleError::InvalidWeekday(self.0.clone())),
        }
    }
}

/// Canonical form of a user schedule. Only the normalizer builds these from
/// raw event data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalSchedule {
    /// Every day; the scheduled day is ignored
    Daily,
    Weekly(WeekdayToken),
    /// 1st and 3rd occurrence of the weekday in each month
    Biweekly(WeekdayToken),
    /// Day of month, clamped to the month length when computed
    Monthly(u32),
}

impl CanonicalSchedule {
    pub fn frequency(&self) -> Frequency {
        match self {
            CanonicalSchedule::Daily => Frequency::Daily,
            CanonicalSchedule::Weekly(_) => Frequency::Weekly,
            CanonicalSchedule::Biweekly(_) => Frequency::Biweekly,
            CanonicalSchedule::Monthly(_) => Frequency::Monthly,
        }
    }

    /// Target day of month for monthly schedules
    pub fn month_day(&self) -> Option<u32> {
        match self {
            CanonicalSchedule::Monthly(day) => Some(*day),
            _ => None,
        }
    }

    /// Weekday token for weekly and biweekly schedules
    pub fn weekday(&self) -> Option<&WeekdayToken> {
        match self {
            CanonicalSchedule::Weekly(token) | CanonicalSchedule::Biweekly(token) => Some(token),
            _ => None,
        }
    }
}
