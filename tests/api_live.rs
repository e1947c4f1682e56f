//! Live API test. Run with: `cargo test --features online --test api_live -- --nocapture`
#![cfg(feature = "online")]

use adhan_rs::{Client, DaySource, Method, Prayer};
use chrono::NaiveDate;

#[test]
fn live_single_day_has_all_prayers() {
    let client = Client::default();
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let rec = client
        .fetch_day("Cairo", "Egypt", day, Method::Egyptian)
        .expect("live fetch");
    for p in Prayer::ALL {
        let t = rec.prayer(p).unwrap_or_else(|| panic!("missing {p}"));
        assert_eq!(t.len(), 5, "{p} = {t}");
        assert_eq!(&t[2..3], ":");
    }
}
