use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one hospital or ICU stay.
///
/// Integer identifiers (the common case for MIMIC-style data) sort
/// numerically and come before any textual identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StayId {
    Int(i64),
    Text(String),
}

impl StayId {
    /// Parse a raw cell value; integer-like text becomes [`StayId::Int`].
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Some(StayId::Int(value));
        }
        // "12.0" is what integer ids look like after a float round-trip
        if let Ok(value) = trimmed.parse::<f64>()
            && value.fract() == 0.0
            && value.is_finite()
        {
            return Some(StayId::Int(value as i64));
        }
        Some(StayId::Text(trimmed.to_string()))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StayId::Int(value) => Some(*value),
            StayId::Text(_) => None,
        }
    }
}

impl Ord for StayId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (StayId::Int(a), StayId::Int(b)) => a.cmp(b),
            (StayId::Int(_), StayId::Text(_)) => Ordering::Less,
            (StayId::Text(_), StayId::Int(_)) => Ordering::Greater,
            (StayId::Text(a), StayId::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for StayId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StayId::Int(value) => write!(f, "{value}"),
            StayId::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for StayId {
    fn from(value: i64) -> Self {
        StayId::Int(value)
    }
}
