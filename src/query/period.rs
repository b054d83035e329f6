use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::date_util::{start_of_day, start_of_month, start_of_week};
use crate::error::{Error, Result};
use crate::record::Review;

static RE_LAST_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:last-)?(\d+)(?:d|-days)$").unwrap());
static RE_RELATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([dwm])-(back|forward)$").unwrap());
static RE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})\.\.(\d{4}-\d{2}-\d{2})$").unwrap());

/// Unit for relative period offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Days,
    Weeks,
    Months,
}

impl PeriodUnit {
    /// Days per unit. Months use a fixed 30-day approximation rather than
    /// calendar-month arithmetic; consumers rely on this, so it is kept.
    pub fn day_factor(self) -> u32 {
        match self {
            PeriodUnit::Days => 1,
            PeriodUnit::Weeks => 7,
            PeriodUnit::Months => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

/// A user-selected time period for filtering reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSpec {
    Today,
    Yesterday,
    LastDays(u32),
    ThisWeek,
    ThisMonth,
    AllTime,
    Explicit { start: NaiveDate, end: NaiveDate },
    Relative { count: u32, unit: PeriodUnit, direction: Direction },
}

/// A resolved time window. `contains` carries each period mode's
/// inclusivity rule so the filter pipeline does not need to know which
/// mode produced the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeWindow {
    /// No time restriction (the all-time preset).
    All,
    /// Timestamp interval. Inclusive start; the end is exclusive for
    /// `half_open` windows (yesterday) and inclusive otherwise.
    Stamps {
        start: NaiveDateTime,
        end: NaiveDateTime,
        half_open: bool,
    },
    /// Calendar-date interval, inclusive on both ends. Membership is
    /// decided by the date portion of the timestamp.
    Dates { start: NaiveDate, end: NaiveDate },
}

impl TimeWindow {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        match self {
            TimeWindow::All => true,
            TimeWindow::Stamps {
                start,
                end,
                half_open,
            } => {
                if *half_open {
                    ts >= *start && ts < *end
                } else {
                    ts >= *start && ts <= *end
                }
            }
            TimeWindow::Dates { start, end } => {
                let d = ts.date();
                d >= *start && d <= *end
            }
        }
    }

    pub fn is_bounded(&self) -> bool {
        !matches!(self, TimeWindow::All)
    }
}

impl PeriodSpec {
    /// Parse a period string.
    ///
    /// Supported formats:
    /// - `today`, `yesterday`, `this-week`, `this-month`
    /// - `all` or `all-time`
    /// - `7d` or `last-7-days` — last N days
    /// - `2025-01-01..2025-03-31` — explicit range, inclusive
    /// - `3w-back`, `2m-forward` — relative offset from now
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "today" => return Ok(PeriodSpec::Today),
            "yesterday" => return Ok(PeriodSpec::Yesterday),
            "this-week" => return Ok(PeriodSpec::ThisWeek),
            "this-month" => return Ok(PeriodSpec::ThisMonth),
            "all" | "all-time" => return Ok(PeriodSpec::AllTime),
            _ => {}
        }

        if let Some(caps) = RE_RELATIVE.captures(&s) {
            let count: u32 = caps[1]
                .parse()
                .map_err(|_| Error::PeriodParse(format!("invalid count: {s}")))?;
            let unit = match &caps[2] {
                "d" => PeriodUnit::Days,
                "w" => PeriodUnit::Weeks,
                _ => PeriodUnit::Months,
            };
            let direction = if &caps[3] == "back" {
                Direction::Back
            } else {
                Direction::Forward
            };
            return Ok(PeriodSpec::Relative {
                count,
                unit,
                direction,
            });
        }

        if let Some(caps) = RE_LAST_DAYS.captures(&s) {
            let n: u32 = caps[1]
                .parse()
                .map_err(|_| Error::PeriodParse(format!("invalid day count: {s}")))?;
            return Ok(PeriodSpec::LastDays(n));
        }

        if let Some(caps) = RE_RANGE.captures(&s) {
            let start = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d")
                .map_err(|_| Error::PeriodParse(format!("invalid start date: {s}")))?;
            let end = NaiveDate::parse_from_str(&caps[2], "%Y-%m-%d")
                .map_err(|_| Error::PeriodParse(format!("invalid end date: {s}")))?;
            // end < start is tolerated; the window just matches nothing
            return Ok(PeriodSpec::Explicit { start, end });
        }

        Err(Error::PeriodParse(format!("unrecognized period: {s}")))
    }

    /// Canonical key string for display and JSON output.
    pub fn to_key(&self) -> String {
        match self {
            PeriodSpec::Today => "today".to_string(),
            PeriodSpec::Yesterday => "yesterday".to_string(),
            PeriodSpec::LastDays(n) => format!("last-{n}-days"),
            PeriodSpec::ThisWeek => "this-week".to_string(),
            PeriodSpec::ThisMonth => "this-month".to_string(),
            PeriodSpec::AllTime => "all-time".to_string(),
            PeriodSpec::Explicit { start, end } => format!("{start}..{end}"),
            PeriodSpec::Relative {
                count,
                unit,
                direction,
            } => {
                let u = match unit {
                    PeriodUnit::Days => "d",
                    PeriodUnit::Weeks => "w",
                    PeriodUnit::Months => "m",
                };
                let d = match direction {
                    Direction::Back => "back",
                    Direction::Forward => "forward",
                };
                format!("{count}{u}-{d}")
            }
        }
    }

    /// Resolve this spec against a reference instant into a concrete window.
    pub fn resolve(&self, now: NaiveDateTime) -> TimeWindow {
        match self {
            PeriodSpec::Today => TimeWindow::Stamps {
                start: start_of_day(now),
                end: now,
                half_open: false,
            },
            PeriodSpec::Yesterday => {
                let midnight = start_of_day(now);
                TimeWindow::Stamps {
                    start: midnight - Duration::days(1),
                    end: midnight,
                    half_open: true,
                }
            }
            PeriodSpec::LastDays(n) => TimeWindow::Stamps {
                start: now - Duration::days(*n as i64),
                end: now,
                half_open: false,
            },
            PeriodSpec::ThisWeek => TimeWindow::Stamps {
                start: start_of_week(now),
                end: now,
                half_open: false,
            },
            PeriodSpec::ThisMonth => TimeWindow::Stamps {
                start: start_of_month(now),
                end: now,
                half_open: false,
            },
            PeriodSpec::AllTime => TimeWindow::All,
            PeriodSpec::Explicit { start, end } => TimeWindow::Dates {
                start: *start,
                end: *end,
            },
            PeriodSpec::Relative {
                count,
                unit,
                direction,
            } => {
                let days = Duration::days((*count as i64) * unit.day_factor() as i64);
                match direction {
                    Direction::Back => TimeWindow::Stamps {
                        start: now - days,
                        end: now,
                        half_open: false,
                    },
                    Direction::Forward => TimeWindow::Stamps {
                        start: now,
                        end: now + days,
                        half_open: false,
                    },
                }
            }
        }
    }
}

impl std::fmt::Display for PeriodSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

/// Min and max review dates in the loaded set, for date-picker bounds.
/// Defaults to one year back through today when the set is empty or no
/// date parses.
pub fn date_bounds(records: &[Review], today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let mut min: Option<NaiveDate> = None;
    let mut max: Option<NaiveDate> = None;
    for r in records {
        if let Some(d) = r.date() {
            min = Some(min.map_or(d, |m| m.min(d)));
            max = Some(max.map_or(d, |m| m.max(d)));
        }
    }
    match (min, max) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => (today - Duration::days(365), today),
    }
}
