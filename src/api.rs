//! Synchronous client for the **Aladhan prayer-times API** (`/v1/timingsByCity`).
//!
//! One call returns the timings of a single day. Monthly schedules are built on top
//! of this in [`crate::schedule`], one request per calendar day.
//!
//! ### Notes
//! - Timing values sometimes carry a timezone suffix (`"05:12 (EET)"`); only the
//!   leading `HH:MM` is kept.
//! - Extra events (Sunrise, Imsak, Midnight, ...) are kept alongside the five prayers.
//! - No retries: a failed day is reported to the caller, which skips it.
//!
//! Typical usage:
//! ```no_run
//! # use adhan_rs::{Client, DaySource, Method};
//! # use chrono::NaiveDate;
//! let client = Client::default();
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let timings = client.fetch_day("Cairo", "Egypt", day, Method::Egyptian)?;
//! println!("Fajr: {:?}", timings.get("Fajr"));
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::models::{Method, Prayer, TimingRecord, TimingsResponse, format_date};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Something that can produce the timings of one day.
///
/// [`Client`] is the real implementation; tests plug in deterministic sources.
pub trait DaySource {
    fn fetch_day(
        &self,
        city: &str,
        country: &str,
        date: NaiveDate,
        method: Method,
    ) -> Result<TimingRecord>;
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_base_url("https://api.aladhan.com/v1")
    }
}

// Keep -, _, . readable in query values
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string()
}

static TIME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{2}:\d{2})").expect("valid time regex"));

/// Strip anything after the leading `HH:MM`. Returns `None` if there is no time.
pub fn normalize_time(raw: &str) -> Option<String> {
    TIME_PREFIX.captures(raw).map(|c| c[1].to_string())
}

/// Turn a decoded API response into a [`TimingRecord`].
///
/// Errors if the API reports a non-200 code, returns no timings, or returns a
/// required prayer whose value is not a time of day.
pub fn record_from_response(resp: TimingsResponse) -> Result<TimingRecord> {
    if resp.code != 200 {
        bail!("aladhan api error: code {} ({})", resp.code, resp.status);
    }
    if resp.data.timings.is_empty() {
        bail!("response has an empty timings object");
    }

    let mut out = BTreeMap::new();
    for (name, raw) in resp.data.timings {
        let value = match normalize_time(&raw) {
            Some(t) => t,
            None => {
                if Prayer::ALL.iter().any(|p| p.key() == name) {
                    bail!("malformed time for {}: {:?}", name, raw);
                }
                raw.trim().to_string()
            }
        };
        out.insert(name, value);
    }
    Ok(TimingRecord::new(out))
}

impl Client {
    /// Build a client against another API root (e.g. a local mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = HttpClient::builder()
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("adhan_rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    fn day_url(&self, city: &str, country: &str, date: NaiveDate, method: Method) -> String {
        format!(
            "{}/timingsByCity?city={}&country={}&method={}&date={}",
            self.base_url,
            enc(city),
            enc(country),
            method.code(),
            format_date(date)
        )
    }
}

impl DaySource for Client {
    /// Fetch the timings of a single day.
    ///
    /// ### Errors
    /// - Empty city or country
    /// - Network/HTTP error (any non-2xx status)
    /// - JSON decoding error or missing `data.timings`
    fn fetch_day(
        &self,
        city: &str,
        country: &str,
        date: NaiveDate,
        method: Method,
    ) -> Result<TimingRecord> {
        if city.trim().is_empty() {
            bail!("city is required");
        }
        if country.trim().is_empty() {
            bail!("country is required");
        }

        let url = self.day_url(city, country, date, method);
        log::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("GET {}", url))?;
        if !resp.status().is_success() {
            bail!("request failed with HTTP {}", resp.status());
        }
        let body: TimingsResponse = resp.json().context("decode json")?;
        record_from_response(body).with_context(|| format!("timings for {}", format_date(date)))
    }
}
