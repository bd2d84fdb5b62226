use std::fmt::{self, Display};

use chrono::{Local, NaiveTime};

/// Error returned for an unrecognized time of day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidTime(pub String);

impl Display for InvalidTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time of day: {:?}", self.0)
    }
}

impl std::error::Error for InvalidTime {}

/// Daily opening hours of the business.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BusinessHours {
    open: NaiveTime,
    close: NaiveTime,
}

impl BusinessHours {
    /// Parses opening and closing times such as `9:00 AM` or `18:00`.
    pub fn parse(open: &str, close: &str) -> Result<Self, InvalidTime> {
        Ok(Self {
            open: parse_time(open)?,
            close: parse_time(close)?,
        })
    }

    /// Returns `true` if the business is open at `time`.
    ///
    /// The opening time is inclusive and the closing time exclusive. Hours
    /// that close before they open span midnight.
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        if self.open <= self.close {
            self.open <= time && time < self.close
        } else {
            time >= self.open || time < self.close
        }
    }

    /// Returns `true` if the business is open right now, local time.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open_at(Local::now().time())
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, InvalidTime> {
    let normalized = s.trim().to_ascii_uppercase();
    ["%I:%M %p", "%I:%M%p", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&normalized, fmt).ok())
        .ok_or_else(|| InvalidTime(s.to_owned()))
}
