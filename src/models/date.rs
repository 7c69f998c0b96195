//! Calendar date parsing

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, SailError};

/// Textual form accepted for every requested date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A date without time of day, parsed from `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn parse(input: &str) -> Result<Self> {
        NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| SailError::invalid_date(input))
    }

    #[must_use]
    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Midnight UTC at the start of this date
    #[must_use]
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.0.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Whole days before this date, saturating at the calendar bounds
    #[must_use]
    pub fn days_before(&self, days: u64) -> NaiveDate {
        self.0.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
    }

    /// Whole days after this date, saturating at the calendar bounds
    #[must_use]
    pub fn days_after(&self, days: u64) -> NaiveDate {
        self.0.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDate {
    type Err = SailError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = SailError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}
