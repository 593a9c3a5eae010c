//! Live character counters for multi-line fields

use serde::Serialize;

use crate::types::CounterLevel;

/// Remaining count below which a counter turns to the warning state
pub const DEFAULT_WARNING_THRESHOLD: usize = 50;

/// Counter attached to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    pub max_length: usize,
    pub warning_threshold: usize,
}

/// Outcome of evaluating a value against its counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterReading {
    /// `max_length - length` of the value as typed, negative when over the limit
    pub remaining: i64,
    pub level: CounterLevel,
    /// Value cut down to `max_length` characters, when it was over the limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<String>,
}

impl CounterReading {
    /// Text shown under the field
    pub fn label(&self) -> String {
        format!("{} characters remaining", self.remaining)
    }
}

impl CharCounter {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
        }
    }

    pub fn with_warning_threshold(mut self, threshold: usize) -> Self {
        self.warning_threshold = threshold;
        self
    }

    /// Evaluate a value. Length is measured in characters, not bytes.
    pub fn evaluate(&self, value: &str) -> CounterReading {
        let length = value.chars().count();
        let remaining = self.max_length as i64 - length as i64;

        if remaining < 0 {
            CounterReading {
                remaining,
                level: CounterLevel::LimitReached,
                truncated: Some(value.chars().take(self.max_length).collect()),
            }
        } else if remaining < self.warning_threshold as i64 {
            CounterReading {
                remaining,
                level: CounterLevel::Warning,
                truncated: None,
            }
        } else {
            CounterReading {
                remaining,
                level: CounterLevel::Normal,
                truncated: None,
            }
        }
    }
}
