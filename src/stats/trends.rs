use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::error::Error;
use crate::format::Locale;

use super::{round_to, PeriodStats};

pub const TREND_MONTHS: u32 = 6;

/// Per-month series, oldest month first. Index `k` of every field refers to
/// the same month.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    pub months: Vec<String>,
    pub impressions: Vec<u64>,
    pub clicks: Vec<u64>,
    pub ctr: Vec<f64>,
    pub budget: Vec<f64>,
}

impl TrendSeries {
    pub fn push(&mut self, label: String, stats: &PeriodStats) {
        self.months.push(label);
        self.impressions.push(stats.impressions);
        self.clicks.push(stats.clicks);
        self.ctr.push(round_to(stats.ctr, 2));
        self.budget.push(round_to(stats.budget, 2));
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// A calendar month in UTC as the closed interval
/// `[first day 00:00:00.000, last day 23:59:59.999]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Result<MonthWindow, Error> {
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        let start = first_instant(year, month)?;
        let end = first_instant(next_year, next_month)? - Duration::milliseconds(1);

        Ok(MonthWindow {
            year,
            month,
            start,
            end,
        })
    }

    pub fn containing(date: DateTime<Utc>) -> Result<MonthWindow, Error> {
        MonthWindow::new(date.year(), date.month())
    }

    /// The month `months` calendar months before this one, rolling over years.
    pub fn back(self, months: u32) -> Result<MonthWindow, Error> {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) - months as i64;
        let year = index.div_euclid(12) as i32;
        let month = index.rem_euclid(12) as u32 + 1;

        MonthWindow::new(year, month)
    }

    pub fn label(self, locale: Locale) -> String {
        locale.month_abbreviation(self.month)
    }
}

fn first_instant(year: i32, month: u32) -> Result<DateTime<Utc>, Error> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            Error::ExistentialState(format!("{}-{:02} is not a valid calendar month", year, month))
        })
}

/// The `count` months ending with the one containing `now`, oldest first.
pub fn trailing_months(now: DateTime<Utc>, count: u32) -> Result<Vec<MonthWindow>, Error> {
    let current = MonthWindow::containing(now)?;

    (0..count).rev().map(|i| current.back(i)).collect()
}

/// Assembles per-month stats, given in the same order as their windows.
pub fn build_trend_series(months: &[(MonthWindow, PeriodStats)], locale: Locale) -> TrendSeries {
    let mut series = TrendSeries::default();
    for (window, stats) in months {
        series.push(window.label(locale), stats);
    }
    series
}
