//! `weekdayRange`, `dateRange` and `timeRange`.
//!
//! Every form accepts a trailing `"GMT"` argument selecting UTC instead of the
//! local offset. Ranges whose start lies after their end wrap around the
//! natural cycle (week, year, month or day). Ranges bounded by years are linear.

use super::HelperValue;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Timelike};

const WEEKDAYS: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];
const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// The instant an evaluation runs at, sampled once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationClock {
    local: DateTime<FixedOffset>,
}

impl EvaluationClock {
    pub fn new(local: DateTime<FixedOffset>) -> Self {
        Self { local }
    }

    pub fn local(&self) -> DateTime<FixedOffset> {
        self.local
    }

    fn wall_clock(&self, gmt: bool) -> NaiveDateTime {
        if gmt {
            self.local.naive_utc()
        } else {
            self.local.naive_local()
        }
    }
}

fn split_gmt(args: &[HelperValue]) -> (&[HelperValue], bool) {
    match args.split_last() {
        Some((last, rest)) if last.as_str().is_some_and(|s| s.eq_ignore_ascii_case("GMT")) => (rest, true),
        _ => (args, false),
    }
}

fn in_cycle(value: u32, start: u32, end: u32) -> bool {
    if start <= end {
        start <= value && value <= end
    } else {
        value >= start || value <= end
    }
}

fn position(names: &[&str], value: &HelperValue) -> Option<u32> {
    let name = value.as_str()?;
    names
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(name))
        .map(|i| i as u32)
}

pub fn weekday_range(clock: &EvaluationClock, args: &[HelperValue]) -> bool {
    let (args, gmt) = split_gmt(args);
    let today = clock.wall_clock(gmt).weekday().num_days_from_monday();

    match args {
        [wd] => position(&WEEKDAYS, wd) == Some(today),
        [wd1, wd2] => match (position(&WEEKDAYS, wd1), position(&WEEKDAYS, wd2)) {
            (Some(start), Some(end)) => in_cycle(today, start, end),
            _ => false,
        },
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatePart {
    Day(u32),
    Month(u32),
    Year(i32),
}

fn date_part(value: &HelperValue) -> Option<DatePart> {
    if let Some(month) = position(&MONTHS, value) {
        return Some(DatePart::Month(month + 1));
    }
    match value.as_integer()? {
        n @ 1..=31 => Some(DatePart::Day(n as u32)),
        n if n > 31 => i32::try_from(n).ok().map(DatePart::Year),
        _ => None,
    }
}

pub fn date_range(clock: &EvaluationClock, args: &[HelperValue]) -> bool {
    use DatePart::*;

    let (args, gmt) = split_gmt(args);
    if args.is_empty() || args.len() > 6 {
        return false;
    }
    let parts: Option<Vec<DatePart>> = args.iter().map(date_part).collect();
    let Some(parts) = parts else {
        return false;
    };

    let today = clock.wall_clock(gmt).date();
    let (d, m, y) = (today.day(), today.month(), today.year());

    match parts.as_slice() {
        [Day(a)] => d == *a,
        [Month(a)] => m == *a,
        [Year(a)] => y == *a,
        [Day(a), Day(b)] => in_cycle(d, *a, *b),
        [Month(a), Month(b)] => in_cycle(m, *a, *b),
        [Year(a), Year(b)] => *a <= y && y <= *b,
        [Day(d1), Month(m1), Day(d2), Month(m2)] => in_cycle(m * 32 + d, m1 * 32 + d1, m2 * 32 + d2),
        [Month(m1), Year(y1), Month(m2), Year(y2)] => (*y1, *m1) <= (y, m) && (y, m) <= (*y2, *m2),
        [Day(d1), Month(m1), Year(y1), Day(d2), Month(m2), Year(y2)] => {
            (*y1, *m1, *d1) <= (y, m, d) && (y, m, d) <= (*y2, *m2, *d2)
        }
        _ => false,
    }
}

fn time_component(value: &HelperValue, max: u32) -> Option<u32> {
    let n = u32::try_from(value.as_integer()?).ok()?;
    (n <= max).then_some(n)
}

pub fn time_range(clock: &EvaluationClock, args: &[HelperValue]) -> bool {
    let (args, gmt) = split_gmt(args);
    let now = clock.wall_clock(gmt).time();

    let limits: &[u32] = match args.len() {
        1 | 2 => &[23, 23],
        4 => &[23, 59, 23, 59],
        6 => &[23, 59, 59, 23, 59, 59],
        _ => return false,
    };
    let values: Option<Vec<u32>> = args
        .iter()
        .zip(limits.iter())
        .map(|(value, max)| time_component(value, *max))
        .collect();
    let Some(v) = values else {
        return false;
    };

    // an end bound given without seconds covers the whole end minute or hour
    let (start, end) = match v.as_slice() {
        [h] => return now.hour() == *h,
        [h1, h2] => (h1 * 3600, h2 * 3600 + 3599),
        [h1, m1, h2, m2] => (h1 * 3600 + m1 * 60, h2 * 3600 + m2 * 60 + 59),
        [h1, m1, s1, h2, m2, s2] => (h1 * 3600 + m1 * 60 + s1, h2 * 3600 + m2 * 60 + s2),
        _ => return false,
    };
    in_cycle(now.num_seconds_from_midnight(), start, end)
}
