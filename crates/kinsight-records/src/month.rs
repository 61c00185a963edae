//! Calendar month key ("YYYY-MM")

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Month is validated on construction, so day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.and_then(|d| d.pred_opt()).unwrap_or_default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {s:?}"))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format!("expected YYYY-MM, got {s:?}"));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in {s:?}"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in {s:?}"))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in {s:?}"))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let m: YearMonth = "2025-02".parse().unwrap();
        assert_eq!(m.year(), 2025);
        assert_eq!(m.month(), 2);
        assert_eq!(m.to_string(), "2025-02");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("2025-1".parse::<YearMonth>().is_err());
        assert!("202501".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_month_bounds() {
        let feb: YearMonth = "2024-02".parse().unwrap();
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let dec: YearMonth = "2025-12".parse().unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert!(dec.contains(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()));
        assert!(!dec.contains(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn test_serde_as_string() {
        let m: YearMonth = "2025-11".parse().unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"2025-11\"");
        let back: YearMonth = serde_json::from_str("\"2025-11\"").unwrap();
        assert_eq!(back, m);
    }
}
