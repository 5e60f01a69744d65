// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A wall-clock reminder, stored as `"<hour>:<minute>"` without zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderTime {
    hour: u32,
    minute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReminderTimeError {
    #[error("reminder time {0:?} is not in \"<hour>:<minute>\" form")]
    Format(String),
    #[error("reminder hour {0} is out of range 0-23")]
    Hour(u32),
    #[error("reminder minute {0} is out of range 0-59")]
    Minute(u32),
}

impl ReminderTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ReminderTimeError> {
        if hour > 23 {
            return Err(ReminderTimeError::Hour(hour));
        }
        if minute > 59 {
            return Err(ReminderTimeError::Minute(minute));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        // Both fields are range-checked on construction.
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hour, self.minute)
    }
}

impl FromStr for ReminderTime {
    type Err = ReminderTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || ReminderTimeError::Format(s.to_string());

        let (hour, minute) = s.split_once(':').ok_or_else(format_err)?;
        // "9:00:00" is rejected as well as "9".
        if minute.contains(':') {
            return Err(format_err());
        }
        let hour = hour.parse::<u32>().map_err(|_| format_err())?;
        let minute = minute.parse::<u32>().map_err(|_| format_err())?;

        Self::new(hour, minute)
    }
}

impl Serialize for ReminderTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReminderTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_no_zero_padding() {
        let time = ReminderTime::new(9, 5).unwrap();
        assert_eq!(time.to_string(), "9:5");
    }

    #[test]
    fn test_accessors_expose_parsed_fields() {
        let time: ReminderTime = "7:45".parse().unwrap();
        assert_eq!(time.hour(), 7);
        assert_eq!(time.minute(), 45);
        assert_eq!(time.as_naive_time(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
    }

    #[test]
    fn test_parse_accepts_padded_and_unpadded() {
        assert_eq!("09:00".parse(), ReminderTime::new(9, 0));
        assert_eq!("23:59".parse(), ReminderTime::new(23, 59));
        assert_eq!("0:0".parse(), ReminderTime::new(0, 0));
    }

    #[test]
    fn test_parse_rejects_missing_minute() {
        let err = "9".parse::<ReminderTime>().unwrap_err();
        assert_eq!(err, ReminderTimeError::Format("9".to_string()));
    }

    #[test]
    fn test_parse_rejects_extra_components_and_garbage() {
        assert!("9:00:00".parse::<ReminderTime>().is_err());
        assert!("nine:30".parse::<ReminderTime>().is_err());
        assert!(":30".parse::<ReminderTime>().is_err());
        assert!("-1:30".parse::<ReminderTime>().is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            "24:00".parse::<ReminderTime>(),
            Err(ReminderTimeError::Hour(24))
        );
        assert_eq!(
            "12:60".parse::<ReminderTime>(),
            Err(ReminderTimeError::Minute(60))
        );
    }
}
