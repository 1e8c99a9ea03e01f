//! History projections: the "current day" and "monthly average" views.
//!
//! Historical distance is an estimate. The ledger keeps a single distance
//! reading, so every day with activity is assumed to have covered exactly the
//! current reading. Both views and the daily report share that formula
//! through [`DistanceEstimate`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Calendar, EngineError, Kilometers, MoneyCents, Record, aggregate::DaySummary,
    aggregate::per_distance,
};

/// Which history projection is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryMode {
    #[default]
    #[serde(rename = "dia")]
    CurrentDay,
    #[serde(rename = "mes")]
    MonthlyAverage,
}

impl HistoryMode {
    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentDay => "dia",
            Self::MonthlyAverage => "mes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CurrentDay => "Current Day",
            Self::MonthlyAverage => "Monthly Average",
        }
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HistoryMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dia" | "day" | "current-day" => Ok(Self::CurrentDay),
            "mes" | "month" | "monthly-average" => Ok(Self::MonthlyAverage),
            other => Err(EngineError::InvalidMode(format!("unknown history mode: {other}"))),
        }
    }
}

/// Estimated distance over a set of worked days.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DistanceEstimate {
    pub total: Kilometers,
    pub days_worked: usize,
    pub per_day: Kilometers,
}

impl DistanceEstimate {
    pub fn new(days_worked: usize, reading: Kilometers) -> Self {
        Self {
            total: reading * days_worked,
            days_worked,
            per_day: reading,
        }
    }
}

/// Estimate for the calendar month of `now`.
pub fn monthly_distance<'a>(
    calendar: &Calendar,
    records: impl IntoIterator<Item = &'a Record>,
    reading: Kilometers,
    now: DateTime<Utc>,
) -> DistanceEstimate {
    let month = calendar.filter_by_month(records, now);
    DistanceEstimate::new(calendar.distinct_day_count(month), reading)
}

/// Estimate over every day with at least one record.
pub fn all_time_distance<'a>(
    calendar: &Calendar,
    records: impl IntoIterator<Item = &'a Record>,
    reading: Kilometers,
) -> DistanceEstimate {
    DistanceEstimate::new(calendar.distinct_day_count(records), reading)
}

/// Single-day view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurrentDayView {
    pub daily_balance: MoneyCents,
    /// Same as `daily_balance`: a single day has no separate best.
    pub best_day: MoneyCents,
    pub distance_today: Kilometers,
    pub estimated_monthly_distance: Kilometers,
    pub estimated_total_distance: Kilometers,
    pub profit_per_distance_today: f64,
}

/// Averages over the days worked in the current month.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MonthlyAverageView {
    pub days_worked: usize,
    pub average_daily_balance: f64,
    /// Best daily result, never below zero.
    pub best_day: MoneyCents,
    pub average_distance_per_day: f64,
    pub total_distance_this_month: Kilometers,
    pub total_distance_all_time: Kilometers,
    pub average_profit_per_distance: f64,
}

/// Totals of one worked day, with the distance assigned to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub summary: DaySummary,
    pub distance: Kilometers,
}

/// The projection selected by a [`HistoryMode`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HistoryView {
    CurrentDay(CurrentDayView),
    MonthlyAverage(MonthlyAverageView),
}

impl HistoryView {
    pub fn mode(&self) -> HistoryMode {
        match self {
            Self::CurrentDay(_) => HistoryMode::CurrentDay,
            Self::MonthlyAverage(_) => HistoryMode::MonthlyAverage,
        }
    }
}

pub fn current_day(
    calendar: &Calendar,
    records: &[Record],
    reading: Kilometers,
    now: DateTime<Utc>,
) -> CurrentDayView {
    let daily_balance = DaySummary::from_records(calendar.filter_by_day(records, now)).net;
    let month = monthly_distance(calendar, records, reading, now);
    let all_time = all_time_distance(calendar, records, reading);

    CurrentDayView {
        daily_balance,
        best_day: daily_balance,
        distance_today: reading,
        estimated_monthly_distance: month.total,
        estimated_total_distance: all_time.total,
        profit_per_distance_today: per_distance(daily_balance.to_major(), reading),
    }
}

/// Per-day totals for the month of `now`, oldest day first.
pub fn month_days(
    calendar: &Calendar,
    records: &[Record],
    reading: Kilometers,
    now: DateTime<Utc>,
) -> Vec<DayBreakdown> {
    calendar
        .group_by_day(calendar.filter_by_month(records, now))
        .into_iter()
        .map(|(date, day)| DayBreakdown {
            date,
            summary: DaySummary::from_records(day),
            distance: reading,
        })
        .collect()
}

pub fn monthly_average(
    calendar: &Calendar,
    records: &[Record],
    reading: Kilometers,
    now: DateTime<Utc>,
) -> MonthlyAverageView {
    let days = month_days(calendar, records, reading, now);
    if days.is_empty() {
        return MonthlyAverageView::default();
    }

    let worked = days.len();
    let gains: MoneyCents = days.iter().map(|d| d.summary.gains).sum();
    let losses: MoneyCents = days.iter().map(|d| d.summary.losses).sum();
    let month_balance = gains - losses;
    let month_distance: f64 = days.iter().map(|d| d.distance.value()).sum();
    let best_day = days
        .iter()
        .map(|d| d.summary.net)
        .fold(MoneyCents::ZERO, MoneyCents::max);
    let total_distance_this_month = reading * worked;

    MonthlyAverageView {
        days_worked: worked,
        average_daily_balance: month_balance.to_major() / worked as f64,
        best_day,
        average_distance_per_day: month_distance / worked as f64,
        total_distance_this_month,
        total_distance_all_time: all_time_distance(calendar, records, reading).total,
        average_profit_per_distance: per_distance(month_balance.to_major(), total_distance_this_month),
    }
}

/// Renders the view for `mode`.
pub fn project(
    mode: HistoryMode,
    calendar: &Calendar,
    records: &[Record],
    reading: Kilometers,
    now: DateTime<Utc>,
) -> HistoryView {
    match mode {
        HistoryMode::CurrentDay => HistoryView::CurrentDay(current_day(calendar, records, reading, now)),
        HistoryMode::MonthlyAverage => {
            HistoryView::MonthlyAverage(monthly_average(calendar, records, reading, now))
        }
    }
}

/// Counters shown by the settings screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overview {
    pub record_count: usize,
    pub distance_today: Kilometers,
    pub month: DistanceEstimate,
    pub all_time: DistanceEstimate,
    pub mode: HistoryMode,
}

pub fn overview(
    calendar: &Calendar,
    records: &[Record],
    reading: Kilometers,
    mode: HistoryMode,
    now: DateTime<Utc>,
) -> Overview {
    Overview {
        record_count: records.len(),
        distance_today: reading,
        month: monthly_distance(calendar, records, reading, now),
        all_time: all_time_distance(calendar, records, reading),
        mode,
    }
}
