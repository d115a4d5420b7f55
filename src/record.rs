use serde::{Deserialize, Serialize};

/// One `Device:` row as read from the log store.
#[derive(Debug)]
pub struct LogRecord {
    pub timestamp: String,
    pub entry: String,
}

#[derive(Debug, PartialEq)]
pub struct ValuePoint {
    pub timestamp: String,
    pub value: f64,
}

impl ValuePoint {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

/// A record after normalization, as emitted by `--dump`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRecord {
    pub timestamp: String,
    pub device: String,
    pub value: f64,
    pub cleaned: String,
    pub rule: String,
}
