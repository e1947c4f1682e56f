use crate::models::{MonthlySchedule, Prayer, TimingRecord, format_date};
use chrono::NaiveDate;
use csv::WriterBuilder;
use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{date}: missing {prayer} time")]
    MissingPrayer { date: String, prayer: Prayer },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("pdf error: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// Write `schedule` in the given format.
pub fn save<P: AsRef<Path>>(
    format: ExportFormat,
    schedule: &MonthlySchedule,
    path: P,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => save_json(schedule, path),
        ExportFormat::Csv => save_csv(schedule, path),
        ExportFormat::Pdf => save_pdf(schedule, path),
    }
}

/// Write through a temp file in the target directory, then rename over `path`.
fn write_atomically<P, F>(path: P, write: F) -> Result<(), ExportError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> Result<(), ExportError>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// The five required times of a record, in column order.
fn prayer_row(date: NaiveDate, record: &TimingRecord) -> Result<[&str; 5], ExportError> {
    let mut out = [""; 5];
    for (slot, prayer) in out.iter_mut().zip(Prayer::ALL) {
        *slot = record.prayer(prayer).ok_or_else(|| ExportError::MissingPrayer {
            date: format_date(date),
            prayer,
        })?;
    }
    Ok(out)
}

/// Save the schedule as a pretty JSON object (4-space indent), extra fields included.
pub fn save_json<P: AsRef<Path>>(schedule: &MonthlySchedule, path: P) -> Result<(), ExportError> {
    write_atomically(path, |f| {
        let mut w = BufWriter::new(f);
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut w, fmt);
        schedule.serialize(&mut ser)?;
        w.flush()?;
        Ok(())
    })
}

/// Read back a file written by [`save_json`].
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<MonthlySchedule, ExportError> {
    let f = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(f))?)
}

pub const CSV_HEADER: [&str; 6] = ["Date", "Fajr", "Dhuhr", "Asr", "Maghrib", "Isha"];

/// Save one row per date with the five prayers.
///
/// Fails before touching the file if any record lacks one of them.
pub fn save_csv<P: AsRef<Path>>(schedule: &MonthlySchedule, path: P) -> Result<(), ExportError> {
    let rows = schedule
        .iter()
        .map(|(date, record)| prayer_row(date, record).map(|times| (format_date(date), times)))
        .collect::<Result<Vec<_>, _>>()?;

    write_atomically(path, |f| {
        let mut wtr = WriterBuilder::new().from_writer(f);
        wtr.write_record(CSV_HEADER)?;
        for (date, times) in &rows {
            wtr.write_record(std::iter::once(date.as_str()).chain(times.iter().copied()))?;
        }
        wtr.flush()?;
        Ok(())
    })
}

// US letter, in PDF points.
pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;
pub const TOP_Y: f32 = 750.0;
pub const BOTTOM_MARGIN: f32 = 50.0;
pub const LEFT_X: f32 = 50.0;
pub const LINE_STEP: f32 = 20.0;
/// Advance after the last line of a date block.
pub const BLOCK_GAP: f32 = 30.0;
pub const FONT_SIZE: f32 = 12.0;
/// Vertical space taken by one date block (date line + five prayers).
pub const BLOCK_HEIGHT: f32 = LINE_STEP * Prayer::ALL.len() as f32 + BLOCK_GAP;

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<TextLine>,
}

/// Lay out the document: one block per date, new page when the next block would
/// run past the bottom margin. Blocks are never split.
pub fn paginate(schedule: &MonthlySchedule) -> Result<Vec<Page>, ExportError> {
    let mut pages = vec![Page::default()];
    let mut y = TOP_Y;

    for (date, record) in schedule.iter() {
        let times = prayer_row(date, record)?;
        if y - BLOCK_HEIGHT < BOTTOM_MARGIN {
            pages.push(Page::default());
            y = TOP_Y;
        }

        let mut block = Vec::with_capacity(1 + times.len());
        block.push(format!("Date: {}", format_date(date)));
        for (prayer, time) in Prayer::ALL.iter().zip(times) {
            block.push(format!("{}: {}", prayer, time));
        }

        let last = block.len() - 1;
        let page = pages.last_mut().expect("pages is never empty");
        for (i, text) in block.into_iter().enumerate() {
            page.lines.push(TextLine { y, text });
            y -= if i == last { BLOCK_GAP } else { LINE_STEP };
        }
    }
    Ok(pages)
}

fn pdf_err<E: std::fmt::Debug>(e: E) -> ExportError {
    ExportError::Pdf(format!("{:?}", e))
}

/// Save a paginated US-letter PDF in Helvetica 12pt.
pub fn save_pdf<P: AsRef<Path>>(schedule: &MonthlySchedule, path: P) -> Result<(), ExportError> {
    let pages = paginate(schedule)?;

    let width = Mm::from(Pt(PAGE_WIDTH_PT));
    let height = Mm::from(Pt(PAGE_HEIGHT_PT));
    let (doc, first_page, first_layer) = PdfDocument::new("Prayer Times", width, height, "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;

    for (i, page) in pages.iter().enumerate() {
        let (page_idx, layer_idx) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, "Layer 1")
        };
        let layer = doc.get_page(page_idx).get_layer(layer_idx);
        for line in &page.lines {
            layer.use_text(
                line.text.as_str(),
                FONT_SIZE,
                Mm::from(Pt(LEFT_X)),
                Mm::from(Pt(line.y)),
                &font,
            );
        }
    }

    write_atomically(path, |f| doc.save(&mut BufWriter::new(f)).map_err(pdf_err))
}
