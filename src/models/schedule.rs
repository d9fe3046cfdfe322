use std::{fmt, str::FromStr};

use chrono::{NaiveDate, Timelike};

/// A wall-clock check time (hour, minute) in the configured zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckTime {
    pub hour: u32,
    pub minute: u32,
}

impl CheckTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn matches<T: Timelike>(&self, t: &T) -> bool {
        t.hour() == self.hour && t.minute() == self.minute
    }
}

impl fmt::Display for CheckTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for CheckTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got {s:?}"))?;
        let hour = h.trim().parse::<u32>().map_err(|e| format!("{s:?}: {e}"))?;
        let minute = m.trim().parse::<u32>().map_err(|e| format!("{s:?}: {e}"))?;
        CheckTime::new(hour, minute).ok_or_else(|| format!("{s:?} is not a valid time of day"))
    }
}

/// (date, hour, minute) of a processed check slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: CheckTime,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}
