//! # Slot Availability
//!
//! Turns a day's working-hours window and a service duration into bookable
//! start times, then removes the ones already held by blocking appointments.
//!
//! 1. The calendar date picks a weekday (Sunday = 0) and that day's window.
//! 2. Slots start at the window's opening time and step by the service
//!    duration while a whole slot still fits before closing. A trailing
//!    remainder shorter than the duration is dropped.
//! 3. Booked times are removed by exact `HH:MM` string comparison. The
//!    generator's ascending order is kept.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ScheduleError;
use crate::models::working_hours::{DayOfWeek, DaySchedule, WorkingHoursConfig};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses zero-padded or bare 24-hour `HH:MM` into minutes since midnight.
pub fn parse_time_of_day(value: &str) -> Result<u32, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime(value.to_string());

    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;

    // 24:00 closes a window that runs to midnight
    if minutes >= 60 || hours > 24 || hours * 60 + minutes > MINUTES_PER_DAY {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

pub fn format_time_of_day(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(value.to_string()))
}

/// Start times of every whole `duration_minutes` slot in `[start, end)`.
pub fn generate_slots(
    start: u32,
    end: u32,
    duration_minutes: i64,
) -> Result<Vec<String>, ScheduleError> {
    if duration_minutes <= 0 {
        return Err(ScheduleError::InvalidDuration(duration_minutes));
    }
    if end < start {
        return Err(ScheduleError::InvalidWindow {
            start: format_time_of_day(start),
            end: format_time_of_day(end),
        });
    }

    let step = u32::try_from(duration_minutes).unwrap_or(u32::MAX);
    let mut slots = Vec::new();
    let mut current = start;
    while current.checked_add(step).is_some_and(|slot_end| slot_end <= end) {
        slots.push(format_time_of_day(current));
        current += step;
    }
    Ok(slots)
}

/// Window for the weekday of `date`, or `None` when that day is closed.
pub fn resolve_day(config: &WorkingHoursConfig, date: NaiveDate) -> Option<&DaySchedule> {
    config
        .day(DayOfWeek::of(date))
        .filter(|schedule| schedule.enabled)
}

/// Slots for one open day.
pub fn slots_for_day(schedule: &DaySchedule, duration_minutes: i64) -> Result<Vec<String>, ScheduleError> {
    let start = parse_time_of_day(&schedule.start)?;
    let end = parse_time_of_day(&schedule.end)?;
    generate_slots(start, end, duration_minutes)
}

/// `generated - booked`, keeping the generator's order.
pub fn filter_available(generated: Vec<String>, booked: &BTreeSet<String>) -> Vec<String> {
    generated
        .into_iter()
        .filter(|slot| !booked.contains(slot))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub available_slots: Vec<String>,
    pub booked_slots: Vec<String>,
}

/// Availability for `date` given the working hours and the times already held.
///
/// A closed day yields an empty result with no booked slots reported.
pub fn compute_availability(
    config: &WorkingHoursConfig,
    date: NaiveDate,
    duration_minutes: i64,
    booked: BTreeSet<String>,
) -> Result<SlotAvailability, ScheduleError> {
    let Some(schedule) = resolve_day(config, date) else {
        return Ok(SlotAvailability::default());
    };

    let generated = slots_for_day(schedule, duration_minutes)?;
    let available_slots = filter_available(generated, &booked);

    Ok(SlotAvailability {
        available_slots,
        booked_slots: booked.into_iter().collect(),
    })
}
