use chrono::{DateTime, FixedOffset};

/// Port for reading the wall clock
pub trait ClockPort: Send + Sync {
    /// Current local time, carrying the local UTC offset
    fn now(&self) -> DateTime<FixedOffset>;
}
