//! Festival date-range strings ("June 5-16, 2025", "February 13–March 12, 2025")
//! turned into start/end instants in the app's timezone.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Australia::Sydney;

const RANGE_DELIMITERS: [char; 2] = ['-', '–'];
const DATE_FORMATS: [&str; 2] = ["%B %d, %Y", "%B %e, %Y"];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r", (\d{4})").expect("valid year regex"));

/// Source of "now". Tests pin it with [`FixedClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Badge urgency for the days-until-start countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Countdown {
    Imminent,
    Soon,
    Later,
}

impl Countdown {
    pub fn for_days(days: i64) -> Self {
        match days {
            d if d < 7 => Countdown::Imminent,
            d if d < 30 => Countdown::Soon,
            _ => Countdown::Later,
        }
    }
}

#[derive(Clone)]
pub struct DateRangeParser {
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DateRangeParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateRangeParser")
            .field("tz", &self.tz)
            .finish_non_exhaustive()
    }
}

impl Default for DateRangeParser {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE, Arc::new(SystemClock))
    }
}

impl DateRangeParser {
    pub fn new(tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self { tz, clock }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.tz)
    }

    /// Never fails: an unreadable start becomes "now", an unreadable end
    /// becomes the start.
    pub fn parse(&self, text: &str) -> DateRange {
        let now = self.now();
        let Some(split_at) = text.find(|c: char| RANGE_DELIMITERS.contains(&c)) else {
            tracing::debug!(text, "no range delimiter, using now");
            return DateRange {
                start: now,
                end: now,
            };
        };
        let delimiter_len = text[split_at..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(1);

        let year = YEAR_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| now.year().to_string());

        let start_part = text[..split_at].trim();
        let end_part = YEAR_RE.replace(&text[split_at + delimiter_len..], "");
        let end_part = end_part.trim();

        let end_fragment = if !end_part.is_empty() && end_part.chars().all(|c| c.is_ascii_digit())
        {
            let month = start_part.split_whitespace().next().unwrap_or_default();
            format!("{month} {end_part}")
        } else {
            end_part.to_string()
        };

        let start = self
            .parse_day(&format!("{start_part}, {year}"))
            .unwrap_or_else(|| {
                tracing::debug!(text, "unreadable start date, using now");
                now
            });
        let end = self
            .parse_day(&format!("{end_fragment}, {year}"))
            .unwrap_or_else(|| {
                tracing::debug!(text, "unreadable end date, using start");
                start
            });

        DateRange { start, end }
    }

    pub fn is_upcoming(&self, text: &str) -> bool {
        self.parse(text).end >= self.now()
    }

    /// Whole days from today to the start day, never negative.
    pub fn days_until_start(&self, text: &str) -> i64 {
        let start = self.parse(text).start.date_naive();
        let today = self.now().date_naive();
        (start - today).num_days().max(0)
    }

    pub fn countdown(&self, text: &str) -> Countdown {
        Countdown::for_days(self.days_until_start(text))
    }

    fn parse_day(&self, input: &str) -> Option<DateTime<Tz>> {
        let date = DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())?;
        local_midnight(date, self.tz)
    }
}

fn local_midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(dt, _) => Some(dt),
        // midnight skipped by a DST jump; the day starts an hour later
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    }
}
