use chrono::{DateTime, Utc};

/// Clock trait for abstracting time operations
pub trait Clock: Send + Sync {
    /// Current time as milliseconds since the Unix epoch
    /// Snapshots are stamped with this value
    fn now_epoch_millis(&self) -> i64;
}

/// Production implementation of Clock using system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_epoch_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: DateTime<Utc>,
}

impl FixedClock {
    pub fn from_rfc3339(timestamp_str: &str) -> Result<Self, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(timestamp_str)?.with_timezone(&Utc);
        Ok(Self { timestamp })
    }

    /// Out-of-range values fall back to the Unix epoch
    pub fn from_epoch_millis(millis: i64) -> Self {
        let timestamp = DateTime::from_timestamp_millis(millis).unwrap_or_default();
        Self { timestamp }
    }
}

impl Clock for FixedClock {
    fn now_epoch_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
