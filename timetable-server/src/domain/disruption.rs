//! Service disruption types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::time::{TIME_RANGE_FORMATS, parse_with_candidates};

/// Validity window of a disruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Parses a `"<start>-<end>"` range.
    ///
    /// Each side may be in German (`21.03.2024 05:00`) or English
    /// (`03/21/2024 05:00`) form. Returns `None` if either side matches
    /// neither.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::TimeRange;
    ///
    /// let de = TimeRange::parse("21.03.2024 05:00-22.03.2024 23:59").unwrap();
    /// let en = TimeRange::parse("03/21/2024 05:00 - 03/22/2024 23:59").unwrap();
    /// assert_eq!(de, en);
    ///
    /// assert!(TimeRange::parse("until further notice").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let (start, end) = s.split_once('-')?;
        Some(Self {
            start: parse_with_candidates(start, &TIME_RANGE_FORMATS)?,
            end: parse_with_candidates(end, &TIME_RANGE_FORMATS)?,
        })
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A service alert attached to a connection or leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disruption {
    /// Reference URL the upstream keys this disruption by.
    pub key: String,
    pub id: Option<String>,
    pub header: Option<String>,
    pub lead: Option<String>,
    pub text: Option<String>,
    pub time_range: Option<TimeRange>,
}

impl Disruption {
    /// One-line summary: `"header: lead"`, or whichever half is present.
    pub fn summary(&self) -> Option<String> {
        fn non_blank(s: &Option<String>) -> Option<&str> {
            s.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        match (non_blank(&self.header), non_blank(&self.lead)) {
            (Some(h), Some(l)) => Some(format!("{h}: {l}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }
}
