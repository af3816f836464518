//! Weekly opening hours.
//!
//! Hours are stored as one line, Monday first:
//! `"Monday: 6:0 - 18:0, Tuesday: Closed, ..."`. Minutes are not zero padded
//! in storage. Display output starts on Sunday and uses a 12-hour clock.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use validator::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoursError {
    #[error("Malformed hours entry: {0}")]
    MalformedEntry(String),

    #[error("Unknown day: {0}")]
    UnknownDay(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Day listed twice: {0}")]
    DuplicateDay(String),
}

/// Day of the week. Ordering is Monday first, matching storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Display order.
    pub const SUNDAY_FIRST: [Day; 7] = [
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    fn from_name(name: &str) -> Option<Day> {
        Self::SUNDAY_FIRST.into_iter().find(|d| d.name() == name)
    }
}

/// Time of day on a quarter-hour grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, HoursError> {
        let time = Self { hour, minute };
        time.check()?;
        Ok(time)
    }

    fn check(&self) -> Result<(), HoursError> {
        if self.hour > 23 || !matches!(self.minute, 0 | 15 | 30 | 45) {
            return Err(HoursError::InvalidTime(format!("{}:{}", self.hour, self.minute)));
        }
        Ok(())
    }

    fn parse(s: &str) -> Result<Self, HoursError> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| HoursError::InvalidTime(s.to_string()))?;
        let hour = h.parse().map_err(|_| HoursError::InvalidTime(s.to_string()))?;
        let minute = m.parse().map_err(|_| HoursError::InvalidTime(s.to_string()))?;
        Self::new(hour, minute)
    }

    fn storage(&self) -> String {
        format!("{}:{}", self.hour, self.minute)
    }
}

impl fmt::Display for TimeOfDay {
    /// `6:00 AM`, `12:15 PM`, `12:00 AM` for midnight.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour12 = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        let meridiem = if self.hour < 12 { "AM" } else { "PM" };
        write!(f, "{}:{:02} {}", hour12, self.minute, meridiem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DaySchedule {
    Closed,
    Open { open: TimeOfDay, close: TimeOfDay },
}

/// Opening hours keyed by day. Days may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessHours {
    days: BTreeMap<Day, DaySchedule>,
}

impl BusinessHours {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, day: Day, schedule: DaySchedule) -> Self {
        self.days.insert(day, schedule);
        self
    }

    pub fn get(&self, day: Day) -> Option<&DaySchedule> {
        self.days.get(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Checks every listed time is on the quarter-hour grid.
    pub fn check(&self) -> Result<(), HoursError> {
        for schedule in self.days.values() {
            if let DaySchedule::Open { open, close } = schedule {
                open.check()?;
                close.check()?;
            }
        }
        Ok(())
    }

    pub fn to_storage_string(&self) -> String {
        self.days
            .iter()
            .map(|(day, schedule)| match schedule {
                DaySchedule::Closed => format!("{}: Closed", day.name()),
                DaySchedule::Open { open, close } => {
                    format!("{}: {} - {}", day.name(), open.storage(), close.storage())
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parses the storage form. An empty string yields empty hours.
    pub fn parse(s: &str) -> Result<Self, HoursError> {
        let mut hours = Self::new();
        if s.trim().is_empty() {
            return Ok(hours);
        }

        for entry in s.split(", ") {
            let (name, schedule_text) = entry
                .split_once(": ")
                .ok_or_else(|| HoursError::MalformedEntry(entry.to_string()))?;
            let day = Day::from_name(name.trim())
                .ok_or_else(|| HoursError::UnknownDay(name.trim().to_string()))?;

            let schedule = if schedule_text.trim() == "Closed" {
                DaySchedule::Closed
            } else {
                let (open, close) = schedule_text
                    .split_once(" - ")
                    .ok_or_else(|| HoursError::MalformedEntry(entry.to_string()))?;
                DaySchedule::Open {
                    open: TimeOfDay::parse(open)?,
                    close: TimeOfDay::parse(close)?,
                }
            };

            if hours.days.insert(day, schedule).is_some() {
                return Err(HoursError::DuplicateDay(day.name().to_string()));
            }
        }
        Ok(hours)
    }

    /// Human-readable hours, Sunday first, skipping unlisted days.
    pub fn display(&self) -> String {
        Day::SUNDAY_FIRST
            .iter()
            .filter_map(|day| {
                self.days.get(day).map(|schedule| match schedule {
                    DaySchedule::Closed => format!("{}: Closed", day.name()),
                    DaySchedule::Open { open, close } => {
                        format!("{}: {}–{}", day.name(), open, close)
                    }
                })
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `validator` hook for request DTOs carrying hours.
pub fn validate_hours(hours: &BusinessHours) -> Result<(), ValidationError> {
    hours.check().map_err(|e| {
        let mut err = ValidationError::new("hours");
        err.message = Some(e.to_string().into());
        err
    })
}
