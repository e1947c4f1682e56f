//! Monthly aggregation: one [`DaySource::fetch_day`] call per calendar day.

use crate::api::DaySource;
use crate::models::{Method, MonthlySchedule, format_date};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("year {0} is out of range")]
    InvalidYear(i32),
}

/// Everything needed to fetch one month of timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthQuery {
    pub city: String,
    pub country: String,
    pub year: i32,
    pub month: u32,
    pub method: Method,
}

/// All days of `year`/`month`, first to last.
pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, ScheduleError> {
    if !(1..=12).contains(&month) {
        return Err(ScheduleError::InvalidMonth(month));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(ScheduleError::InvalidYear(year))?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, ScheduleError> {
    month_days(year, month).map(|days| days.len() as u32)
}

/// Fetch every day of the month in ascending order.
///
/// Days whose fetch fails are logged and left out. An empty schedule means no
/// day could be retrieved; callers should treat that as a failure.
pub fn fetch_month<S: DaySource + ?Sized>(
    source: &S,
    query: &MonthQuery,
) -> Result<MonthlySchedule, ScheduleError> {
    fetch_month_with_progress(source, query, |_, _| {})
}

/// Like [`fetch_month`], calling `on_day(done, total)` after each day.
pub fn fetch_month_with_progress<S, F>(
    source: &S,
    query: &MonthQuery,
    mut on_day: F,
) -> Result<MonthlySchedule, ScheduleError>
where
    S: DaySource + ?Sized,
    F: FnMut(usize, usize),
{
    let days = month_days(query.year, query.month)?;
    let total = days.len();
    log::info!(
        "fetching {} days for {}, {} ({:02}/{}) with method {}",
        total,
        query.city,
        query.country,
        query.month,
        query.year,
        query.method.code()
    );

    let mut schedule = MonthlySchedule::new();
    for (i, date) in days.into_iter().enumerate() {
        match source.fetch_day(&query.city, &query.country, date, query.method) {
            Ok(record) => schedule.insert(date, record),
            Err(err) => log::warn!("skipping {}: {:#}", format_date(date), err),
        }
        on_day(i + 1, total);
    }

    log::info!("retrieved {}/{} days", schedule.len(), total);
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 1).unwrap(), 31);
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2023, 2).unwrap(), 28);
        assert_eq!(days_in_month(1900, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
        assert_eq!(days_in_month(2024, 4).unwrap(), 30);
        assert_eq!(days_in_month(2024, 12).unwrap(), 31);
    }

    #[test]
    fn rejects_bad_month() {
        assert_eq!(month_days(2024, 0), Err(ScheduleError::InvalidMonth(0)));
        assert_eq!(month_days(2024, 13), Err(ScheduleError::InvalidMonth(13)));
    }

    #[test]
    fn days_are_ascending_and_bounded() {
        let days = month_days(2024, 12).unwrap();
        assert_eq!(days.first().unwrap().day(), 1);
        assert_eq!(days.last().unwrap().day(), 31);
        assert!(days.windows(2).all(|w| w[0] < w[1]));
        assert!(days.iter().all(|d| d.month() == 12 && d.year() == 2024));
    }
}
