use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque ID for a connected observer
pub type SessionId = String;

/// Upper bound (inclusive) of the position selector
pub const SELECTED_VALUE_MAX: u8 = 25;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CounterKey {
    First,
    Last,
}

impl CounterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKey::First => "first",
            CounterKey::Last => "last",
        }
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown counter key: {0:?}")]
pub struct ParseCounterKeyError(pub String);

impl FromStr for CounterKey {
    type Err = ParseCounterKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(CounterKey::First),
            "last" => Ok(CounterKey::Last),
            other => Err(ParseCounterKeyError(other.to_string())),
        }
    }
}

/// The fixed set of counters. Serializes as `{"first": n, "last": n}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counters {
    pub first: i64,
    pub last: i64,
}

impl Counters {
    pub fn get(&self, key: CounterKey) -> i64 {
        match key {
            CounterKey::First => self.first,
            CounterKey::Last => self.last,
        }
    }

    pub(crate) fn get_mut(&mut self, key: CounterKey) -> &mut i64 {
        match key {
            CounterKey::First => &mut self.first,
            CounterKey::Last => &mut self.last,
        }
    }

    /// `last - first`; negative when the front has moved past the back
    pub fn diff(&self) -> i64 {
        self.last - self.first
    }
}

/// Authoritative shared record. Copies handed out by the store are detached
/// from the live value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CounterState {
    pub counters: Counters,
    pub selected_value: u8,
    pub is_recording: bool,
}
