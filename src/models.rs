use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Date format used for API requests and schedule keys (`DD-MM-YYYY`).
pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Calculation methods understood by the Aladhan API.
///
/// Only these integer codes are ever sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    ShiaIthnaAshari,
    Karachi,
    #[default]
    Isna,
    Mwl,
    UmmAlQura,
    Egyptian,
    Tehran,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::ShiaIthnaAshari,
        Method::Karachi,
        Method::Isna,
        Method::Mwl,
        Method::UmmAlQura,
        Method::Egyptian,
        Method::Tehran,
    ];

    /// Integer code expected by the `method` query parameter.
    pub fn code(self) -> u8 {
        match self {
            Method::ShiaIthnaAshari => 0,
            Method::Karachi => 1,
            Method::Isna => 2,
            Method::Mwl => 3,
            Method::UmmAlQura => 4,
            Method::Egyptian => 5,
            Method::Tehran => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::ShiaIthnaAshari => "Shia Ithna-Ansari",
            Method::Karachi => "University of Islamic Sciences, Karachi",
            Method::Isna => "Islamic Society of North America (ISNA)",
            Method::Mwl => "Muslim World League (MWL)",
            Method::UmmAlQura => "Umm Al-Qura, Makkah",
            Method::Egyptian => "Egyptian General Authority of Survey",
            Method::Tehran => "Institute of Geophysics, University of Tehran",
        }
    }

    /// Short identifier used on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Method::ShiaIthnaAshari => "jafari",
            Method::Karachi => "karachi",
            Method::Isna => "isna",
            Method::Mwl => "mwl",
            Method::UmmAlQura => "makkah",
            Method::Egyptian => "egyptian",
            Method::Tehran => "tehran",
        }
    }

    pub fn from_code(code: u8) -> Option<Method> {
        Method::ALL.into_iter().find(|m| m.code() == code)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown calculation method '{0}' (try `adhan methods`)")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    /// Accepts the slug, the integer code or the display name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        if let Ok(code) = needle.parse::<u8>() {
            return Method::from_code(code).ok_or_else(|| UnknownMethod(s.to_string()));
        }
        Method::ALL
            .into_iter()
            .find(|m| m.slug().eq_ignore_ascii_case(needle) || m.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// The five prayers every exported row must carry, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Case-sensitive key in the API's `timings` object.
    pub fn key(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Order in which a day's events are shown. Unknown keys follow alphabetically.
const DISPLAY_ORDER: [&str; 11] = [
    "Imsak",
    "Fajr",
    "Sunrise",
    "Dhuhr",
    "Asr",
    "Sunset",
    "Maghrib",
    "Isha",
    "Midnight",
    "Firstthird",
    "Lastthird",
];

/// One day's timings: event name -> `HH:MM`.
///
/// Keeps every field the API returned, not only the five prayers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimingRecord(BTreeMap<String, String>);

impl TimingRecord {
    pub fn new(timings: BTreeMap<String, String>) -> Self {
        Self(timings)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Time for one of the required prayers, or `None` if the API left it out.
    pub fn prayer(&self, prayer: Prayer) -> Option<&str> {
        self.get(prayer.key())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in the canonical daily order.
    pub fn iter_display(&self) -> impl Iterator<Item = (&str, &str)> {
        let known = DISPLAY_ORDER
            .iter()
            .filter_map(|k| self.0.get_key_value(*k));
        let rest = self
            .0
            .iter()
            .filter(|(k, _)| !DISPLAY_ORDER.iter().any(|d| *d == k.as_str()));
        known
            .chain(rest)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TimingRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Timings for the days of one month, keyed by date in ascending order.
///
/// Serialized as a JSON object whose keys are `DD-MM-YYYY` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlySchedule {
    days: BTreeMap<NaiveDate, TimingRecord>,
}

impl MonthlySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, record: TimingRecord) {
        self.days.insert(date, record);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&TimingRecord> {
        self.days.get(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &TimingRecord)> {
        self.days.iter().map(|(d, r)| (*d, r))
    }

    /// Keys as they appear in exports (`DD-MM-YYYY`).
    pub fn date_keys(&self) -> Vec<String> {
        self.days.keys().copied().map(format_date).collect()
    }
}

impl Serialize for MonthlySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.days.iter().map(|(d, r)| (format_date(*d), r)))
    }
}

impl<'de> Deserialize<'de> for MonthlySchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, TimingRecord>::deserialize(deserializer)?;
        let mut days = BTreeMap::new();
        for (key, record) in raw {
            let date = parse_date(&key)
                .ok_or_else(|| D::Error::custom(format!("invalid date key '{key}', expected DD-MM-YYYY")))?;
            days.insert(date, record);
        }
        Ok(Self { days })
    }
}

/// Envelope returned by `timingsByCity`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingsResponse {
    pub code: u16,
    #[serde(default)]
    pub status: String,
    pub data: TimingsData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingsData {
    pub timings: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_codes_skip_six() {
        let codes: Vec<u8> = Method::ALL.iter().map(|m| m.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5, 7]);
        assert_eq!(Method::from_code(6), None);
        assert_eq!(Method::from_code(5), Some(Method::Egyptian));
    }

    #[test]
    fn method_parses_slug_code_and_name() {
        assert_eq!("egyptian".parse::<Method>().unwrap(), Method::Egyptian);
        assert_eq!("7".parse::<Method>().unwrap(), Method::Tehran);
        assert_eq!(
            "muslim world league (mwl)".parse::<Method>().unwrap(),
            Method::Mwl
        );
        assert!("6".parse::<Method>().is_err());
        assert!("astrology".parse::<Method>().is_err());
    }

    #[test]
    fn display_order_puts_extras_in_daily_order() {
        let rec: TimingRecord = [
            ("Isha", "19:00"),
            ("Zenith", "12:00"),
            ("Fajr", "05:00"),
            ("Sunrise", "06:30"),
            ("Dhuhr", "12:05"),
        ]
        .into_iter()
        .collect();
        let names: Vec<&str> = rec.iter_display().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Fajr", "Sunrise", "Dhuhr", "Isha", "Zenith"]);
    }

    #[test]
    fn schedule_serializes_with_date_keys() {
        let mut s = MonthlySchedule::new();
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        s.insert(d, [("Fajr", "05:10")].into_iter().collect());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["02-01-2024"]["Fajr"], "05:10");

        let back: MonthlySchedule = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn schedule_rejects_bad_keys() {
        let v = serde_json::json!({ "2024-01-02": { "Fajr": "05:10" } });
        assert!(serde_json::from_value::<MonthlySchedule>(v).is_err());
    }
}
