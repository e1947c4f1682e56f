//! adhan_rs
//!
//! A small Rust library for retrieving monthly Islamic prayer-time schedules from
//! the Aladhan API and exporting them. Pairs with the `adhan` CLI and the
//! `adhan-gui` desktop app.
//!
//! ### Features
//! - Fetch a whole month of timings for a city/country and calculation method
//! - Tolerate failed days (they are logged and left out)
//! - Save as JSON, CSV or a paginated PDF
//!
//! ### Example
//! ```no_run
//! use adhan_rs::{Client, Method, MonthQuery};
//!
//! let client = Client::default();
//! let query = MonthQuery {
//!     city: "Cairo".into(),
//!     country: "Egypt".into(),
//!     year: 2024,
//!     month: 1,
//!     method: Method::Egyptian,
//! };
//! let schedule = adhan_rs::schedule::fetch_month(&client, &query)?;
//! adhan_rs::storage::save_json(&schedule, "prayer_times_Cairo_2024_1.json")?;
//! adhan_rs::storage::save_pdf(&schedule, "prayer_times_Cairo_2024_1.pdf")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod models;
pub mod schedule;
pub mod shell;
pub mod storage;

pub use api::{Client, DaySource};
pub use models::{Method, MonthlySchedule, Prayer, TimingRecord};
pub use schedule::MonthQuery;
pub use storage::ExportFormat;
