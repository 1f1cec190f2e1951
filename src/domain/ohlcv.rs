//! Price bar representation and bar resolution.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    #[serde(rename = "datetime", serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// Money traded during the bar.
    pub turnover: f64,
}

impl PriceBar {
    /// Calendar date the bar belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Bar interval a strategy trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Minute,
    Daily,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Minute => "1m",
            Resolution::Daily => "1d",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "minute" => Ok(Resolution::Minute),
            "1d" | "daily" => Ok(Resolution::Daily),
            other => Err(format!("unknown resolution '{other}', expected 1m or 1d")),
        }
    }
}

pub(crate) const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

pub(crate) fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&ts.format(LABEL_FORMAT))
}
