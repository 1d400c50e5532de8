//! Due-date windows relative to "today".
//!
//! # Invariants
//! - Ranges are inclusive on both ends.
//! - Weeks are ISO weeks (Monday start).
//! - Todos without a due date never fall inside any window.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use time::{Date, Duration, Month};

/// Time-window filter accepted by list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Today,
    ThisWeek,
    ThisMonth,
}

impl TimeWindow {
    /// Parses `today|thisweek|thismonth`. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today" => Some(Self::Today),
            "thisweek" => Some(Self::ThisWeek),
            "thismonth" => Some(Self::ThisMonth),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "thisweek",
            Self::ThisMonth => "thismonth",
        }
    }

    /// Inclusive date range covered by this window for the given day.
    pub fn range(self, today: Date) -> DateRange {
        match self {
            Self::Today => DateRange {
                start: today,
                end: today,
            },
            Self::ThisWeek => {
                let offset = i64::from(today.weekday().number_days_from_monday());
                let monday = today
                    .checked_sub(Duration::days(offset))
                    .unwrap_or(Date::MIN);
                let sunday = monday.checked_add(Duration::days(6)).unwrap_or(Date::MAX);
                DateRange {
                    start: monday,
                    end: sunday,
                }
            }
            Self::ThisMonth => {
                let first = today.replace_day(1).unwrap_or(today);
                let (next_year, next_month) = match today.month() {
                    Month::December => (today.year() + 1, Month::January),
                    month => (today.year(), month.next()),
                };
                let last = Date::from_calendar_date(next_year, next_month, 1)
                    .ok()
                    .and_then(Date::previous_day)
                    .unwrap_or(Date::MAX);
                DateRange {
                    start: first,
                    end: last,
                }
            }
        }
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::TimeWindow;
    use time::macros::date;

    #[test]
    fn today_is_a_single_day() {
        let range = TimeWindow::Today.range(date!(2024 - 05 - 15));
        assert_eq!(range.start, date!(2024 - 05 - 15));
        assert_eq!(range.end, date!(2024 - 05 - 15));
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-05-15 is a Wednesday.
        let range = TimeWindow::ThisWeek.range(date!(2024 - 05 - 15));
        assert_eq!(range.start, date!(2024 - 05 - 13));
        assert_eq!(range.end, date!(2024 - 05 - 19));

        let sunday = TimeWindow::ThisWeek.range(date!(2024 - 05 - 19));
        assert_eq!(sunday.start, date!(2024 - 05 - 13));
    }

    #[test]
    fn week_spans_year_boundary() {
        // 2025-01-01 is a Wednesday in ISO week 2025-W01.
        let range = TimeWindow::ThisWeek.range(date!(2025 - 01 - 01));
        assert_eq!(range.start, date!(2024 - 12 - 30));
        assert_eq!(range.end, date!(2025 - 01 - 05));
        assert!(range.contains(date!(2024 - 12 - 31)));
    }

    #[test]
    fn month_covers_leap_february_and_december() {
        let february = TimeWindow::ThisMonth.range(date!(2024 - 02 - 10));
        assert_eq!(february.start, date!(2024 - 02 - 01));
        assert_eq!(february.end, date!(2024 - 02 - 29));

        let december = TimeWindow::ThisMonth.range(date!(2023 - 12 - 31));
        assert_eq!(december.start, date!(2023 - 12 - 01));
        assert_eq!(december.end, date!(2023 - 12 - 31));
        assert!(!december.contains(date!(2024 - 01 - 01)));
    }

    #[test]
    fn parse_round_trips_wire_names() {
        for window in [TimeWindow::Today, TimeWindow::ThisWeek, TimeWindow::ThisMonth] {
            assert_eq!(TimeWindow::parse(window.as_str()), Some(window));
        }
        assert_eq!(TimeWindow::parse("nextweek"), None);
    }
}
