use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ScheduleError;
use crate::schedule::parse_time_of_day;

/// Weekday keys as stored in the working-hours document.
///
/// Declaration order matches the calendar index used by the resolver
/// (0 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Day-of-week of a calendar date, taken from the date itself.
    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_sunday() as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub enabled: bool,
    pub start: String,
    pub end: String,
}

impl DaySchedule {
    pub fn open(start: &str, end: &str) -> Self {
        Self {
            enabled: true,
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn closed() -> Self {
        Self {
            enabled: false,
            start: "00:00".to_string(),
            end: "00:00".to_string(),
        }
    }
}

/// Per-weekday bookable windows. Days missing from the map are closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingHoursConfig {
    days: BTreeMap<DayOfWeek, DaySchedule>,
}

impl WorkingHoursConfig {
    /// An empty configuration: every day closed.
    pub fn empty() -> Self {
        Self {
            days: BTreeMap::new(),
        }
    }

    /// Hours used when no configuration has been stored yet.
    pub fn standard() -> Self {
        Self::empty()
            .with_day(DayOfWeek::Monday, DaySchedule::open("08:00", "17:00"))
            .with_day(DayOfWeek::Tuesday, DaySchedule::open("08:00", "17:00"))
            .with_day(DayOfWeek::Wednesday, DaySchedule::open("08:00", "17:00"))
            .with_day(DayOfWeek::Thursday, DaySchedule::open("08:00", "17:00"))
            .with_day(DayOfWeek::Friday, DaySchedule::open("08:00", "17:00"))
            .with_day(DayOfWeek::Saturday, DaySchedule::open("08:00", "12:00"))
            .with_day(DayOfWeek::Sunday, DaySchedule::closed())
    }

    pub fn with_day(mut self, day: DayOfWeek, schedule: DaySchedule) -> Self {
        self.days.insert(day, schedule);
        self
    }

    pub fn day(&self, day: DayOfWeek) -> Option<&DaySchedule> {
        self.days.get(&day)
    }

    /// Checks every enabled day has parseable times with `start <= end`.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for schedule in self.days.values().filter(|s| s.enabled) {
            let start = parse_time_of_day(&schedule.start)?;
            let end = parse_time_of_day(&schedule.end)?;
            if end < start {
                return Err(ScheduleError::InvalidWindow {
                    start: schedule.start.clone(),
                    end: schedule.end.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for WorkingHoursConfig {
    fn default() -> Self {
        Self::standard()
    }
}
