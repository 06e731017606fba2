use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::Serialize;
use std::fmt;

/// One column of the month grid. Derived on every request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date_key: String,
    pub weekday_label: String,
    pub weekday_short: String,
    pub is_weekend: bool,
    pub is_today: bool,
}

/// A displayed month. `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.trim().split_once('-')?;
        if month.len() != 2 {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn month_name(&self) -> String {
        self.first_day().format("%B").to_string()
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month).unwrap_or(0)
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// Day of the month before the first of the following month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_first.pred_opt()?;
    debug_assert_eq!(last.month(), first.month());
    Some(last.day())
}

/// Canonical `YYYY-MM-DD` built from the date's own fields. Callers pass a
/// local calendar date; nothing here converts through UTC.
pub fn date_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Accepts only keys that round-trip through `date_key`.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
    (date_key(date) == key).then_some(date)
}

/// The local calendar date right now.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The browser's own date when it is within a day of `server`, otherwise
/// `server`. No two zones are more than a day apart.
pub fn reconcile_today(client: Option<NaiveDate>, server: NaiveDate) -> NaiveDate {
    match client {
        Some(date) if (date - server).num_days().abs() <= 1 => date,
        _ => server,
    }
}

pub fn month_days(month: MonthCursor, today: NaiveDate) -> Vec<DayCell> {
    let today_key = date_key(today);
    let first = month.first_day();

    first
        .iter_days()
        .take(month.days_in_month() as usize)
        .map(|date| {
            let key = date_key(date);
            let weekday = date.weekday();
            DayCell {
                day: date.day(),
                is_today: key == today_key,
                date_key: key,
                weekday_label: narrow_weekday(weekday).to_string(),
                weekday_short: short_weekday(weekday).to_string(),
                is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            }
        })
        .collect()
}

/// Display label for a chart axis, e.g. `Oct 5`.
pub fn short_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

pub fn short_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

fn narrow_weekday(weekday: Weekday) -> &'static str {
    &short_weekday(weekday)[..1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_in_month_handles_leap_years_and_december() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2026, 2), Some(28));
        assert_eq!(days_in_month(2026, 4), Some(30));
        assert_eq!(days_in_month(2026, 12), Some(31));
        assert_eq!(days_in_month(2026, 13), None);
        assert_eq!(days_in_month(2026, 0), None);
    }

    #[test]
    fn date_key_is_zero_padded() {
        assert_eq!(date_key(date(2026, 3, 7)), "2026-03-07");
        assert_eq!(date_key(date(2026, 12, 31)), "2026-12-31");
    }

    #[test]
    fn parse_date_key_rejects_non_canonical_keys() {
        assert_eq!(parse_date_key("2026-03-07"), Some(date(2026, 3, 7)));
        assert_eq!(parse_date_key("2026-3-7"), None);
        assert_eq!(parse_date_key("2026-02-30"), None);
        assert_eq!(parse_date_key("yesterday"), None);
    }

    #[test]
    fn reconcile_today_prefers_browser_date_within_a_day() {
        let server = date(2026, 10, 19);
        assert_eq!(reconcile_today(Some(date(2026, 10, 18)), server), date(2026, 10, 18));
        assert_eq!(reconcile_today(Some(date(2026, 10, 20)), server), date(2026, 10, 20));
        assert_eq!(reconcile_today(Some(date(2026, 10, 16)), server), server);
        assert_eq!(reconcile_today(None, server), server);
    }

    #[test]
    fn month_days_flags_today_and_weekends() {
        let today = date(2026, 10, 18);
        let days = month_days(MonthCursor::containing(today), today);

        assert_eq!(days.len(), 31);
        assert_eq!(days[0].date_key, "2026-10-01");
        assert_eq!(days[0].weekday_short, "Thu");
        assert_eq!(days[0].weekday_label, "T");

        let flagged: Vec<_> = days.iter().filter(|d| d.is_today).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].day, 18);
        assert!(flagged[0].is_weekend, "2026-10-18 is a Sunday");
        assert!(!days[1].is_weekend);
    }

    #[test]
    fn month_days_without_today_has_no_flag() {
        let days = month_days(MonthCursor::new(2026, 2).unwrap(), date(2026, 10, 18));
        assert_eq!(days.len(), 28);
        assert!(days.iter().all(|d| !d.is_today));
    }

    #[test]
    fn cursor_navigation_wraps_years() {
        let january = MonthCursor::new(2026, 1).unwrap();
        assert_eq!(january.prev(), MonthCursor::new(2025, 12).unwrap());
        assert_eq!(january.prev().next(), january);
        assert_eq!(MonthCursor::new(2026, 12).unwrap().next().key(), "2027-01");
    }

    #[test]
    fn cursor_parse_requires_two_digit_month() {
        assert_eq!(MonthCursor::parse("2026-10"), MonthCursor::new(2026, 10));
        assert_eq!(MonthCursor::parse("2026-1"), None);
        assert_eq!(MonthCursor::parse("2026-13"), None);
        assert_eq!(MonthCursor::parse("october"), None);
    }

    #[test]
    fn cursor_display_uses_month_name() {
        let cursor = MonthCursor::new(2026, 10).unwrap();
        assert_eq!(cursor.to_string(), "October 2026");
        assert_eq!(short_label(date(2026, 10, 5)), "Oct 5");
    }
}
