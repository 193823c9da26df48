//! Recurring-task rules.
//!
//! Rules are stored on tasks as a small RRULE subset:
//! `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;UNTIL=20261231`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("recurrence rule has no FREQ")]
    MissingFrequency,
    #[error("unknown frequency: {0}")]
    UnknownFrequency(String),
    #[error("interval must be a positive integer, got {0}")]
    InvalidInterval(String),
    #[error("unknown weekday: {0}")]
    UnknownWeekday(String),
    #[error("invalid UNTIL date: {0}")]
    InvalidUntil(String),
    #[error("unsupported rule part: {0}")]
    UnknownPart(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            _ => Err(RecurrenceError::UnknownFrequency(s.to_string())),
        }
    }
}

const fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_weekday(code: &str) -> Result<Weekday, RecurrenceError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        _ => Err(RecurrenceError::UnknownWeekday(code.to_string())),
    }
}

/// How a task repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Repeat every `interval` periods. Always at least 1.
    pub interval: u32,
    /// Days of the week for weekly rules, Monday first, no duplicates.
    pub weekdays: Vec<Weekday>,
    /// Last date an occurrence may fall on.
    pub until: Option<NaiveDate>,
}

impl RecurrenceRule {
    pub const fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            weekdays: Vec::new(),
            until: None,
        }
    }

    #[must_use]
    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval.max(1);
        self
    }

    #[must_use]
    pub fn on(mut self, weekdays: &[Weekday]) -> Self {
        self.weekdays = normalize_weekdays(weekdays.iter().copied());
        self
    }

    #[must_use]
    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    /// Encodes the rule in its stored form.
    pub fn encode(&self) -> String {
        let mut parts = vec![format!("FREQ={}", self.frequency.as_str())];
        if self.interval > 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }
        if self.frequency == Frequency::Weekly && !self.weekdays.is_empty() {
            let days: Vec<&str> = self.weekdays.iter().map(|d| weekday_code(*d)).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }
        if let Some(until) = self.until {
            parts.push(format!("UNTIL={}", until.format("%Y%m%d")));
        }
        parts.join(";")
    }

    /// The first occurrence strictly after `after`.
    ///
    /// Monthly and yearly rules clamp to the end of shorter months, so a rule
    /// stepping from Jan 31 lands on the last day of February.
    pub fn next_occurrence(&self, after: NaiveDate) -> Option<NaiveDate> {
        let interval = self.interval.max(1);
        let next = match self.frequency {
            Frequency::Daily => after.checked_add_days(Days::new(u64::from(interval))),
            Frequency::Weekly if self.weekdays.is_empty() => {
                after.checked_add_days(Days::new(7 * u64::from(interval)))
            }
            Frequency::Weekly => self.next_listed_weekday(after, interval),
            Frequency::Monthly => after.checked_add_months(Months::new(interval)),
            Frequency::Yearly => interval
                .checked_mul(12)
                .and_then(|months| after.checked_add_months(Months::new(months))),
        }?;

        match self.until {
            Some(until) if next > until => None,
            _ => Some(next),
        }
    }

    fn next_listed_weekday(&self, after: NaiveDate, interval: u32) -> Option<NaiveDate> {
        let today = after.weekday().num_days_from_monday();
        if let Some(later) = self
            .weekdays
            .iter()
            .map(Weekday::num_days_from_monday)
            .find(|d| *d > today)
        {
            return after.checked_add_days(Days::new(u64::from(later - today)));
        }

        let first = self.weekdays.first()?.num_days_from_monday();
        let monday = after.checked_sub_days(Days::new(u64::from(today)))?;
        monday.checked_add_days(Days::new(7 * u64::from(interval) + u64::from(first)))
    }

    /// Up to `count` occurrences following `after`.
    pub fn occurrences(
        &self,
        after: NaiveDate,
        count: usize,
    ) -> impl Iterator<Item = NaiveDate> + '_ {
        std::iter::successors(self.next_occurrence(after), move |d| self.next_occurrence(*d))
            .take(count)
    }
}

fn normalize_weekdays(days: impl Iterator<Item = Weekday>) -> Vec<Weekday> {
    let mut days: Vec<Weekday> = days.collect();
    days.sort_by_key(Weekday::num_days_from_monday);
    days.dedup();
    days
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("RRULE:").unwrap_or(s);

        let mut frequency = None;
        let mut interval = 1;
        let mut weekdays = Vec::new();
        let mut until = None;

        for part in s.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| RecurrenceError::UnknownPart(part.to_string()))?;
            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => frequency = Some(value.trim().parse::<Frequency>()?),
                "INTERVAL" => {
                    interval = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| RecurrenceError::InvalidInterval(value.to_string()))?;
                }
                "BYDAY" => {
                    let parsed = value
                        .split(',')
                        .map(parse_weekday)
                        .collect::<Result<Vec<_>, _>>()?;
                    weekdays = normalize_weekdays(parsed.into_iter());
                }
                "UNTIL" => {
                    let raw = value.trim();
                    let date_part = raw.get(..8).unwrap_or(raw);
                    until = Some(
                        NaiveDate::parse_from_str(date_part, "%Y%m%d")
                            .map_err(|_| RecurrenceError::InvalidUntil(value.to_string()))?,
                    );
                }
                _ => return Err(RecurrenceError::UnknownPart(part.to_string())),
            }
        }

        Ok(Self {
            frequency: frequency.ok_or(RecurrenceError::MissingFrequency)?,
            interval,
            weekdays,
            until,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn encodes_only_non_default_parts() {
        assert_eq!(RecurrenceRule::new(Frequency::Daily).encode(), "FREQ=DAILY");
        let rule = RecurrenceRule::new(Frequency::Weekly)
            .every(2)
            .on(&[Weekday::Wed, Weekday::Mon, Weekday::Wed])
            .until(date(2026, 12, 31));
        assert_eq!(
            rule.encode(),
            "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;UNTIL=20261231"
        );
    }

    #[test]
    fn parses_stored_form() {
        let rule: RecurrenceRule = "RRULE:freq=weekly;byday=fr,tu;UNTIL=20270101T000000Z"
            .parse()
            .unwrap();
        assert_eq!(rule.frequency, Frequency::Weekly);
        assert_eq!(rule.weekdays, vec![Weekday::Tue, Weekday::Fri]);
        assert_eq!(rule.until, Some(date(2027, 1, 1)));
        assert_eq!(rule.interval, 1);
    }

    #[test]
    fn rejects_malformed_rules() {
        assert_eq!(
            "INTERVAL=2".parse::<RecurrenceRule>(),
            Err(RecurrenceError::MissingFrequency)
        );
        assert_eq!(
            "FREQ=HOURLY".parse::<RecurrenceRule>(),
            Err(RecurrenceError::UnknownFrequency("HOURLY".into()))
        );
        assert_eq!(
            "FREQ=DAILY;INTERVAL=0".parse::<RecurrenceRule>(),
            Err(RecurrenceError::InvalidInterval("0".into()))
        );
        assert_eq!(
            "FREQ=WEEKLY;BYDAY=XX".parse::<RecurrenceRule>(),
            Err(RecurrenceError::UnknownWeekday("XX".into()))
        );
        assert!(matches!(
            "FREQ=DAILY;COUNT=3".parse::<RecurrenceRule>(),
            Err(RecurrenceError::UnknownPart(_))
        ));
    }

    #[test]
    fn weekly_rule_walks_listed_days_then_skips_weeks() {
        // 2026-10-19 is a Monday.
        let rule = RecurrenceRule::new(Frequency::Weekly)
            .every(2)
            .on(&[Weekday::Mon, Weekday::Thu]);
        let dates: Vec<_> = rule.occurrences(date(2026, 10, 19), 4).collect();
        assert_eq!(
            dates,
            vec![
                date(2026, 10, 22),
                date(2026, 11, 2),
                date(2026, 11, 5),
                date(2026, 11, 16)
            ]
        );
    }

    #[test]
    fn monthly_rule_clamps_to_month_end() {
        let rule = RecurrenceRule::new(Frequency::Monthly);
        assert_eq!(rule.next_occurrence(date(2026, 1, 31)), Some(date(2026, 2, 28)));
    }

    #[test]
    fn huge_intervals_end_the_series() {
        let rule: RecurrenceRule = "FREQ=YEARLY;INTERVAL=400000000".parse().unwrap();
        assert_eq!(rule.next_occurrence(date(2026, 1, 1)), None);

        let rule: RecurrenceRule = "FREQ=MONTHLY;INTERVAL=4294967295".parse().unwrap();
        assert_eq!(rule.next_occurrence(date(2026, 1, 1)), None);
    }

    #[test]
    fn until_stops_occurrences() {
        let rule = RecurrenceRule::new(Frequency::Daily)
            .every(3)
            .until(date(2026, 10, 25));
        let dates: Vec<_> = rule.occurrences(date(2026, 10, 19), 10).collect();
        assert_eq!(dates, vec![date(2026, 10, 22), date(2026, 10, 25)]);
    }

    #[test]
    fn encode_then_parse_preserves_rule() {
        let rule = RecurrenceRule::new(Frequency::Yearly).every(2);
        assert_eq!(rule.encode().parse::<RecurrenceRule>(), Ok(rule));
    }
}
