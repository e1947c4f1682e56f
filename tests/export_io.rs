use adhan_rs::storage::{self, BLOCK_HEIGHT, BOTTOM_MARGIN, ExportFormat, TOP_Y};
use adhan_rs::{MonthlySchedule, Prayer, TimingRecord};
use chrono::NaiveDate;
use std::fs;
use tempfile::tempdir;

fn sample(days: u32) -> MonthlySchedule {
    let mut s = MonthlySchedule::new();
    for d in 1..=days {
        let date = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let rec: TimingRecord = [
            ("Fajr".to_string(), format!("05:{:02}", d)),
            ("Sunrise".to_string(), "06:49".to_string()),
            ("Dhuhr".to_string(), "12:00".to_string()),
            ("Asr".to_string(), "14:56".to_string()),
            ("Maghrib".to_string(), format!("17:{:02}", 10 + d)),
            ("Isha".to_string(), "18:34".to_string()),
        ]
        .into_iter()
        .collect();
        s.insert(date, rec);
    }
    s
}

#[test]
fn json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prayer_times.json");
    let s = sample(31);

    storage::save_json(&s, &path).unwrap();
    assert_eq!(storage::load_json(&path).unwrap(), s);

    // plain serde_json sees the nested object too
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let obj = v.as_object().unwrap();
    assert_eq!(obj.len(), 31);
    assert_eq!(obj["07-01-2024"]["Fajr"], "05:07");
    assert_eq!(obj["07-01-2024"]["Sunrise"], "06:49");
}

#[test]
fn csv_rows_follow_schedule() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prayer_times.csv");
    let s = sample(10);
    storage::save_csv(&s, &path).unwrap();

    let txt = fs::read_to_string(&path).unwrap();
    assert_eq!(txt.lines().count(), s.len() + 1);
    assert!(txt.starts_with("Date,Fajr,Dhuhr,Asr,Maghrib,Isha\n"));

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), s.len());
    for (row, (date, rec)) in rows.iter().zip(s.iter()) {
        assert_eq!(&row[0], adhan_rs::models::format_date(date));
        for (i, prayer) in Prayer::ALL.iter().enumerate() {
            assert_eq!(Some(&row[i + 1]), rec.prayer(*prayer));
        }
        // extras are not columns
        assert_eq!(row.len(), 6);
    }
}

#[test]
fn single_day_fits_one_page() {
    let pages = storage::paginate(&sample(1)).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].lines.len(), 6);
    assert_eq!(pages[0].lines[0].text, "Date: 01-01-2024");
    assert_eq!(pages[0].lines[0].y, TOP_Y);
    assert_eq!(pages[0].lines[5].text, "Isha: 18:34");
}

#[test]
fn month_spills_over_pages_between_blocks() {
    let s = sample(30);
    let pages = storage::paginate(&s).unwrap();
    assert!(pages.len() > 1);
    // 700pt usable / 130pt per block -> 5 blocks per page
    assert_eq!(pages.len(), 6);

    let mut dates = 0;
    for page in &pages {
        assert_eq!(page.lines.len() % 6, 0, "a block was split");
        for block in page.lines.chunks(6) {
            assert!(block[0].text.starts_with("Date: "));
            assert!(block[5].text.starts_with("Isha: "));
            dates += 1;
        }
        assert_eq!(page.lines[0].y, TOP_Y);
        let lowest_block_top = page.lines[page.lines.len() - 6].y;
        assert!(lowest_block_top - BLOCK_HEIGHT >= BOTTOM_MARGIN);
    }
    assert_eq!(dates, 30);
}

#[test]
fn pdf_file_is_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prayer_times.pdf");
    storage::save(ExportFormat::Pdf, &sample(30), &path).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn exports_overwrite_without_asking() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prayer_times.csv");
    storage::save_csv(&sample(5), &path).unwrap();
    storage::save_csv(&sample(2), &path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 3);
}
