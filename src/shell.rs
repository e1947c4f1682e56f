//! Front-end independent logic shared by the desktop app and the CLI: the
//! fetch step (with automatic JSON export) and the export step.
//!
//! The last fetched schedule is owned by the caller and handed to [`export`]
//! explicitly; `None` means nothing has been fetched yet.

use crate::api::DaySource;
use crate::models::{Method, MonthlySchedule, format_date};
use crate::schedule::{MonthQuery, ScheduleError, fetch_month_with_progress};
use crate::storage::{self, ExportError, ExportFormat};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Please fill in all fields ({0} is missing).")]
    MissingField(&'static str),
    #[error(transparent)]
    InvalidMonth(#[from] ScheduleError),
    #[error("Failed to fetch prayer times for {city}, {country} ({month:02}/{year}).")]
    NoData {
        city: String,
        country: String,
        year: i32,
        month: u32,
    },
    #[error("No data to export. Fetch prayer times first.")]
    NothingFetched,
    #[error("Failed to save {format}: {source}")]
    Export {
        format: &'static str,
        #[source]
        source: ExportError,
    },
}

/// Raw input of the fetch step. `date` is any day of the wanted month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchForm {
    pub city: String,
    pub country: String,
    pub method: Option<Method>,
    pub date: NaiveDate,
}

impl FetchForm {
    /// Check required fields and turn the form into a month query.
    pub fn validate(&self) -> Result<MonthQuery, ShellError> {
        let city = self.city.trim();
        let country = self.country.trim();
        if city.is_empty() {
            return Err(ShellError::MissingField("city"));
        }
        if country.is_empty() {
            return Err(ShellError::MissingField("country"));
        }
        let method = self.method.ok_or(ShellError::MissingField("calculation method"))?;
        Ok(MonthQuery {
            city: city.to_string(),
            country: country.to_string(),
            year: self.date.year(),
            month: self.date.month(),
            method,
        })
    }
}

/// Result of a successful fetch, kept around for later exports.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSchedule {
    pub query: MonthQuery,
    pub schedule: MonthlySchedule,
    pub json_path: PathBuf,
}

/// `prayer_times_<city>_<year>_<month>.<ext>`, with path-unsafe characters in
/// the city replaced by `_`.
pub fn file_name(city: &str, year: i32, month: u32, format: ExportFormat) -> String {
    let city: String = city
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "prayer_times_{}_{}_{}.{}",
        city,
        year,
        month,
        format.extension()
    )
}

pub fn run_fetch<S: DaySource + ?Sized>(
    source: &S,
    form: &FetchForm,
    out_dir: &Path,
) -> Result<FetchedSchedule, ShellError> {
    run_fetch_with_progress(source, form, out_dir, |_, _| {})
}

/// Fetch the month described by `form` and save the JSON export in `out_dir`.
///
/// An empty schedule is reported as [`ShellError::NoData`] and nothing is written.
pub fn run_fetch_with_progress<S, F>(
    source: &S,
    form: &FetchForm,
    out_dir: &Path,
    on_day: F,
) -> Result<FetchedSchedule, ShellError>
where
    S: DaySource + ?Sized,
    F: FnMut(usize, usize),
{
    let query = form.validate()?;
    let schedule = fetch_month_with_progress(source, &query, on_day)?;
    if schedule.is_empty() {
        return Err(ShellError::NoData {
            city: query.city,
            country: query.country,
            year: query.year,
            month: query.month,
        });
    }

    let json_path = out_dir.join(file_name(
        &query.city,
        query.year,
        query.month,
        ExportFormat::Json,
    ));
    storage::save_json(&schedule, &json_path).map_err(|source| ShellError::Export {
        format: ExportFormat::Json.label(),
        source,
    })?;
    log::info!("saved {} days to {}", schedule.len(), json_path.display());

    Ok(FetchedSchedule {
        query,
        schedule,
        json_path,
    })
}

/// Export the last fetched schedule. Returns the written path.
pub fn export(
    last: Option<&FetchedSchedule>,
    format: ExportFormat,
    out_dir: &Path,
) -> Result<PathBuf, ShellError> {
    let fetched = last.ok_or(ShellError::NothingFetched)?;
    let q = &fetched.query;
    let path = out_dir.join(file_name(&q.city, q.year, q.month, format));
    storage::save(format, &fetched.schedule, &path).map_err(|source| ShellError::Export {
        format: format.label(),
        source,
    })?;
    log::info!("exported {} to {}", format.label(), path.display());
    Ok(path)
}

/// Plain-text view of a schedule, one block per date.
pub fn render_schedule(schedule: &MonthlySchedule) -> String {
    let mut out = String::new();
    for (date, record) in schedule.iter() {
        let _ = writeln!(out, "Date: {}", format_date(date));
        out.push_str("----------------------------\n");
        for (name, time) in record.iter_display() {
            let _ = writeln!(out, "{}: {}", name, time);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(city: &str, country: &str, method: Option<Method>) -> FetchForm {
        FetchForm {
            city: city.into(),
            country: country.into(),
            method,
            date: NaiveDate::from_ymd_opt(2024, 2, 17).unwrap(),
        }
    }

    #[test]
    fn validate_extracts_year_and_month() {
        let q = form(" Cairo ", "Egypt", Some(Method::Egyptian))
            .validate()
            .unwrap();
        assert_eq!(q.city, "Cairo");
        assert_eq!((q.year, q.month), (2024, 2));
        assert_eq!(q.method, Method::Egyptian);
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert!(matches!(
            form("  ", "Egypt", Some(Method::Isna)).validate(),
            Err(ShellError::MissingField("city"))
        ));
        assert!(matches!(
            form("Cairo", "", Some(Method::Isna)).validate(),
            Err(ShellError::MissingField("country"))
        ));
        assert!(matches!(
            form("Cairo", "Egypt", None).validate(),
            Err(ShellError::MissingField(_))
        ));
    }

    #[test]
    fn file_names_follow_pattern() {
        assert_eq!(
            file_name("Cairo", 2024, 1, ExportFormat::Json),
            "prayer_times_Cairo_2024_1.json"
        );
        assert_eq!(
            file_name("New York", 2024, 11, ExportFormat::Pdf),
            "prayer_times_New_York_2024_11.pdf"
        );
        assert_eq!(
            file_name("../etc", 2024, 3, ExportFormat::Csv),
            "prayer_times____etc_2024_3.csv"
        );
    }

    #[test]
    fn render_lists_dates_and_times() {
        let mut s = MonthlySchedule::new();
        s.insert(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            [("Isha", "18:34"), ("Fajr", "05:19")].into_iter().collect(),
        );
        let txt = render_schedule(&s);
        assert!(txt.starts_with("Date: 01-01-2024\n"));
        let fajr = txt.find("Fajr: 05:19").unwrap();
        let isha = txt.find("Isha: 18:34").unwrap();
        assert!(fajr < isha);
    }
}
