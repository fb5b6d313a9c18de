use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The reservable portion of a lab day.
///
/// `FullDay` overlaps with everything on the same date; `Forenoon` and
/// `Afternoon` only overlap with themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[serde(rename = "FN")]
    Forenoon,
    #[serde(rename = "AN")]
    Afternoon,
    #[serde(rename = "FULL")]
    FullDay,
}

impl TimeOfDay {
    /// Whether two bookings for the same date collide.
    pub fn overlaps(self, other: TimeOfDay) -> bool {
        self == TimeOfDay::FullDay || other == TimeOfDay::FullDay || self == other
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Forenoon => write!(f, "FN"),
            TimeOfDay::Afternoon => write!(f, "AN"),
            TimeOfDay::FullDay => write!(f, "FULL"),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FN" | "fn" => Ok(TimeOfDay::Forenoon),
            "AN" | "an" => Ok(TimeOfDay::Afternoon),
            "FULL" | "full" => Ok(TimeOfDay::FullDay),
            other => Err(format!("unknown time of day '{other}', expected FN, AN, or FULL")),
        }
    }
}

/// A reservable unit of lab time: one date plus a time-of-day band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

impl Slot {
    pub fn new(date: NaiveDate, time: TimeOfDay) -> Self {
        Self { date, time }
    }

    /// Whether this slot collides with another: same date and overlapping bands.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.date == other.date && self.time.overlaps(other.time)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}
