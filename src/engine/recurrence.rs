//! Daily recurrence arithmetic
//!
//! Pure functions deciding, for a target time of day and "now", whether the
//! countdown must be armed right away or at a later wall-clock instant.
//! Everything here works at minute granularity; seconds of "now" only ever
//! truncate the difference downwards.

use std::{fmt, str::FromStr};

use chrono::{Days, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Default lead time between the wake-up and the target time
pub const DEFAULT_LEAD_MINUTES: u32 = 30;

/// A wall-clock time of day with minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, EngineError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| {
                EngineError::invalid(format!(
                    "time of day out of range: {:02}:{:02}",
                    hour, minute
                ))
            })
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self(NaiveTime::default())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = EngineError;

    /// Parse `H:MM` / `HH:MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EngineError::invalid(format!("expected HH:MM, got '{}'", s));

        let (hour, minute) = s.trim().split_once(':').ok_or_else(malformed)?;
        if minute.len() != 2 {
            return Err(malformed());
        }
        let hour = hour.parse::<u32>().map_err(|_| malformed())?;
        let minute = minute.parse::<u32>().map_err(|_| malformed())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Check a lead time. It must fit inside the hour the immediate window covers.
pub fn validate_lead_minutes(lead_minutes: u32) -> Result<u32, EngineError> {
    if (1..60).contains(&lead_minutes) {
        Ok(lead_minutes)
    } else {
        Err(EngineError::invalid(format!(
            "lead time must be between 1 and 59 minutes (got {})",
            lead_minutes
        )))
    }
}

/// Next date-time whose time of day is `target`.
///
/// Today's occurrence counts as passed when its hour is earlier than now's,
/// or the hours match and its minute is earlier than or equal to now's. A
/// target equal to the current minute therefore lands on tomorrow, so the
/// occurrence is always strictly in the future at minute granularity.
pub fn next_occurrence(target: TimeOfDay, now: NaiveDateTime) -> NaiveDateTime {
    let passed = target.hour() < now.hour()
        || (target.hour() == now.hour() && target.minute() <= now.minute());

    let day = if passed {
        now.date() + Days::new(1)
    } else {
        now.date()
    };
    day.and_time(target.as_naive_time())
}

/// What the scheduler should do for one computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArmPlan {
    /// Already inside the lead window: arm now for `minutes`
    Immediate {
        minutes: u32,
        occurrence: NaiveDateTime,
    },
    /// Wake up at `fire_at` (and every 24h after) to arm for the lead time
    Deferred {
        fire_at: NaiveDateTime,
        occurrence: NaiveDateTime,
    },
}

impl ArmPlan {
    pub fn occurrence(&self) -> NaiveDateTime {
        match self {
            Self::Immediate { occurrence, .. } | Self::Deferred { occurrence, .. } => *occurrence,
        }
    }
}

/// Decide between an immediate arm and a deferred wake-up
pub fn plan(target: TimeOfDay, now: NaiveDateTime, lead_minutes: u32) -> ArmPlan {
    let occurrence = next_occurrence(target, now);

    // Whole minutes only, split into hour and minute components
    let diff_minutes = u32::try_from((occurrence - now).num_minutes()).unwrap_or_default();
    let (hours, minutes) = (diff_minutes / 60, diff_minutes % 60);

    if hours == 0 && minutes <= lead_minutes {
        ArmPlan::Immediate {
            minutes,
            occurrence,
        }
    } else {
        ArmPlan::Deferred {
            fire_at: occurrence - chrono::Duration::minutes(i64::from(lead_minutes)),
            occurrence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn time(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    #[test]
    fn out_of_range_time_of_day_is_rejected() {
        assert!(matches!(
            TimeOfDay::new(24, 0),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(TimeOfDay::new(12, 60).is_err());
        assert!(TimeOfDay::new(23, 59).is_ok());
    }

    #[test]
    fn parses_and_formats_hh_mm() {
        assert_eq!("23:30".parse::<TimeOfDay>().unwrap(), time(23, 30));
        assert_eq!("7:05".parse::<TimeOfDay>().unwrap(), time(7, 5));
        assert_eq!(time(7, 5).to_string(), "07:05");

        assert!("2330".parse::<TimeOfDay>().is_err());
        assert!("23:3".parse::<TimeOfDay>().is_err());
        assert!("25:00".parse::<TimeOfDay>().is_err());
        assert!("ab:cd".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn time_of_day_serializes_as_string() {
        assert_eq!(serde_json::to_string(&time(22, 15)).unwrap(), "\"22:15\"");
        let parsed: TimeOfDay = serde_json::from_str("\"06:45\"").unwrap();
        assert_eq!(parsed, time(6, 45));
        assert!(serde_json::from_str::<TimeOfDay>("\"99:00\"").is_err());
    }

    #[test]
    fn lead_minutes_must_fit_in_an_hour() {
        assert_eq!(validate_lead_minutes(30), Ok(30));
        assert!(validate_lead_minutes(0).is_err());
        assert!(validate_lead_minutes(60).is_err());
    }

    #[test]
    fn later_target_stays_today() {
        assert_eq!(next_occurrence(time(22, 0), at(10, 21, 59)), at(10, 22, 0));
        assert_eq!(next_occurrence(time(9, 1), at(10, 9, 0)), at(10, 9, 1));
    }

    #[test]
    fn earlier_or_equal_target_rolls_to_tomorrow() {
        assert_eq!(next_occurrence(time(8, 0), at(10, 9, 0)), at(11, 8, 0));
        assert_eq!(next_occurrence(time(9, 0), at(10, 9, 30)), at(11, 9, 0));
        // Equal minute counts as passed
        assert_eq!(next_occurrence(time(9, 0), at(10, 9, 0)), at(11, 9, 0));
    }

    #[test]
    fn rollover_crosses_month_end() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 31)
            .unwrap()
            .and_hms_opt(23, 50, 0)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 10, 0)
            .unwrap();
        assert_eq!(next_occurrence(time(0, 10), now), expected);
    }

    #[test]
    fn same_minute_defers_a_full_day_minus_lead() {
        let now = at(10, 9, 0);
        let plan = plan(time(9, 0), now, DEFAULT_LEAD_MINUTES);
        assert_eq!(
            plan,
            ArmPlan::Deferred {
                fire_at: now + chrono::Duration::minutes(1410),
                occurrence: at(11, 9, 0),
            }
        );
    }

    #[test]
    fn inside_lead_window_arms_immediately() {
        assert_eq!(
            plan(time(9, 0), at(10, 8, 50), 30),
            ArmPlan::Immediate {
                minutes: 10,
                occurrence: at(10, 9, 0),
            }
        );
    }

    #[test]
    fn lead_boundary_across_midnight_is_immediate() {
        assert_eq!(
            plan(time(0, 15), at(10, 23, 45), 30),
            ArmPlan::Immediate {
                minutes: 30,
                occurrence: at(11, 0, 15),
            }
        );
    }

    #[test]
    fn one_minute_past_the_window_is_deferred() {
        assert_eq!(
            plan(time(23, 31), at(10, 23, 0), 30),
            ArmPlan::Deferred {
                fire_at: at(10, 23, 1),
                occurrence: at(10, 23, 31),
            }
        );
    }

    #[test]
    fn seconds_truncate_the_difference() {
        let now = at(10, 8, 50) + chrono::Duration::seconds(30);
        assert_eq!(
            plan(time(9, 0), now, 30),
            ArmPlan::Immediate {
                minutes: 9,
                occurrence: at(10, 9, 0),
            }
        );

        let now = at(10, 8, 59) + chrono::Duration::seconds(45);
        assert_eq!(plan(time(9, 0), now, 30).occurrence(), at(10, 9, 0));
        assert!(matches!(
            plan(time(9, 0), now, 30),
            ArmPlan::Immediate { minutes: 0, .. }
        ));
    }
}
