//! Day/time windows during which a rule is active.

use chrono::{Datelike, Local, NaiveTime, Timelike, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placement::error::{PlacementError, PlacementResult};

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
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

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// A local wall-clock moment, as seen by conditions and schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub day: Day,
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    #[must_use]
    pub const fn new(day: Day, hour: u32, minute: u32) -> Self { Self { day, hour, minute } }

    /// The current local time.
    #[must_use]
    pub fn now() -> Self {
        let now = Local::now();
        Self::new(now.weekday().into(), now.hour(), now.minute())
    }

    #[must_use]
    pub const fn minute_of_day(&self) -> u32 { self.hour * 60 + self.minute }
}

/// Active days and an `HH:MM` time window. `from > to` wraps past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Active days; empty means every day.
    #[serde(default)]
    pub days: Vec<Day>,
    /// Start time, `HH:MM`, inclusive.
    #[serde(default)]
    pub from: Option<String>,
    /// End time, `HH:MM`, exclusive.
    #[serde(default)]
    pub to: Option<String>,
}

fn parse_minutes(value: &str) -> PlacementResult<u32> {
    let time = NaiveTime::parse_from_str(value, "%H:%M").map_err(|err| {
        PlacementError::invalid_config(format!("invalid schedule time '{value}': {err}"))
    })?;
    Ok(time.hour() * 60 + time.minute())
}

impl Schedule {
    /// Checks that both times parse.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] for malformed times.
    pub fn validate(&self) -> PlacementResult<()> {
        for time in [&self.from, &self.to].into_iter().flatten() {
            parse_minutes(time)?;
        }
        Ok(())
    }

    /// Returns `true` if the schedule is active at `now`.
    ///
    /// Malformed times never match.
    #[must_use]
    pub fn is_active(&self, now: ClockTime) -> bool {
        if !self.days.is_empty() && !self.days.contains(&now.day) {
            return false;
        }

        let from = match self.from.as_deref().map(parse_minutes).transpose() {
            Ok(from) => from.unwrap_or(0),
            Err(_) => return false,
        };
        let to = match self.to.as_deref().map(parse_minutes).transpose() {
            Ok(to) => to.unwrap_or(24 * 60),
            Err(_) => return false,
        };

        let minute = now.minute_of_day();
        if from <= to {
            minute >= from && minute < to
        } else {
            minute >= from || minute < to
        }
    }
}
