use crate::ports::ClockPort;
use chrono::{DateTime, FixedOffset, Local};

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}
