//! Calendar event model.
//!
//! # Invariants
//! - Events are not order-managed; lists are always sorted by
//!   `(date, time)` with untimed events first on their day.
//! - `time` is exchanged as `HH:MM`; an empty string means no time.

use crate::model::entity::{
    new_entity_id, now_epoch_ms, require_id, require_text, Entity, EntityId, EntityKind,
    ModelValidationError,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One dated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventItem {
    pub id: EntityId,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, with = "clock_time")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
}

impl EventItem {
    /// Creates an event with a generated id and the current timestamp.
    pub fn new(title: impl Into<String>, date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self {
            id: new_entity_id(),
            title: title.into(),
            date,
            time,
            link: None,
            description: None,
            created_at: now_epoch_ms(),
        }
    }
}

impl Entity for EventItem {
    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        require_id(Self::KIND, &self.id)?;
        require_text(Self::KIND, "title", &self.title)
    }
}

/// Compares events by `(date, time)`, then id for determinism.
pub fn compare_events(left: &EventItem, right: &EventItem) -> Ordering {
    left.date
        .cmp(&right.date)
        .then_with(|| left.time.cmp(&right.time))
        .then_with(|| left.id.cmp(&right.id))
}

pub fn sort_events(events: &mut [EventItem]) {
    events.sort_by(compare_events);
}

/// Formats a clock time the way it is exchanged and stored.
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parses `HH:MM` (or `HH:MM:SS`); blank input means no time.
pub fn parse_clock_time(raw: &str) -> Result<Option<NaiveTime>, chrono::ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(Some)
}

mod clock_time {
    use super::{format_clock_time, parse_clock_time};
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&format_clock_time(*time)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) => parse_clock_time(&value).map_err(serde::de::Error::custom),
        }
    }
}
