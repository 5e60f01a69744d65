// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
mod query;
mod reminder_time;

pub use query::{
    day_summaries, delete_by_id, due_for_notification, find_by_id, is_due_for_notification,
    reminder_instant, tasks_due_on, update_by_id, REMINDER_WINDOW_MINUTES,
};
pub use reminder_time::{ReminderTime, ReminderTimeError};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Errors raised while turning stored text back into tasks, or tasks into text.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The stored text is not a valid sequence of task records: bad JSON,
    /// a missing required field, an unparseable due date or reminder time.
    #[error("malformed task record: {0}")]
    MalformedRecord(#[source] serde_json::Error),

    #[error("failed to encode task records: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Represents a task within the system.
///
/// This is both the persisted record (serialized as one element of the JSON
/// array stored under the `tasks` key) and the model returned by the API,
/// which is why the field names are camelCase on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque identifier. Only ever compared for equality.
    pub id: String,

    pub title: String,

    pub description: String,

    // Only the calendar day takes part in "due on" comparisons; the
    // time-of-day is carried through untouched.
    #[serde(with = "due_date_format")]
    pub due_date: NaiveDateTime,

    // `null` and a missing key both decode as "no reminder".
    #[serde(default)]
    pub reminder_time: Option<ReminderTime>,

    // Older records were written before completion existed, and some
    // carry an explicit `null`. Both read as not completed.
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_completed: bool,
}

impl Task {
    /// Creates an incomplete task.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: NaiveDateTime,
        reminder_time: Option<ReminderTime>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            due_date,
            reminder_time,
            is_completed: false,
        }
    }

    pub fn due_day(&self) -> NaiveDate {
        self.due_date.date()
    }

    #[cfg(test)]
    pub fn to_record(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(RecordError::Encode)
    }

    #[cfg(test)]
    pub fn from_record(raw: &str) -> Result<Self, RecordError> {
        serde_json::from_str(raw).map_err(RecordError::MalformedRecord)
    }
}

/// Encodes the whole collection as one JSON array, preserving order.
pub fn encode_tasks(tasks: &[Task]) -> Result<String, RecordError> {
    serde_json::to_string(tasks).map_err(RecordError::Encode)
}

/// Decodes a JSON array of task records.
///
/// Decoding is all-or-nothing: a single bad element fails the whole read.
pub fn decode_tasks(raw: &str) -> Result<Vec<Task>, RecordError> {
    serde_json::from_str(raw).map_err(RecordError::MalformedRecord)
}

/// Parses a stored due date.
///
/// Accepts a local ISO-8601 date-time (`T` or space separated, optional
/// fraction), an RFC 3339 timestamp with an offset, or a bare date.
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn null_as_false<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

mod due_date_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    // Fraction digits are only written when non-zero, so values round-trip
    // exactly and still sort lexically.
    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(
        date: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_due_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("unparseable due date {raw:?}")))
    }
}

/// Body of the create and edit requests.
///
/// `reminder_time` stays textual here so that a bad value can be reported
/// as a client error rather than a body rejection.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    pub reminder_time: Option<String>,
}

/// The single user setting.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub reminders_enabled: bool,
}

/// Calendar marker for one day of a month.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
}
