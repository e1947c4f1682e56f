/*!
 * Desktop application for adhan-rs - monthly prayer times fetcher
 *
 * A cross-platform window providing:
 * - City, country and calculation method selection
 * - Month/year selection and a month fetch (saved to JSON automatically)
 * - Scrollable results and CSV/PDF export of the last fetch
 *
 * Platform support: Windows, macOS, Linux
 */

use adhan_rs::shell::{self, FetchForm, FetchedSchedule};
use adhan_rs::{Client, ExportFormat, Method};
use chrono::{Datelike, Local, NaiveDate};
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([700.0, 640.0])
            .with_min_inner_size([520.0, 420.0])
            .with_title("Prayer Times Fetcher - adhan-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "Prayer Times Fetcher",
        options,
        Box::new(|_cc| Ok(Box::new(AdhanApp::new()))),
    )
}

/// Main application state
struct AdhanApp {
    // Input fields
    city: String,
    country: String,
    method: Method,
    year: i32,
    month: u32,

    // Export options
    export_format: ExportChoice,
    output_path: String,

    // UI state
    is_loading: bool,
    progress: (usize, usize),
    status_message: String,
    error_message: String,
    results: String,

    // Only ever touched on the UI thread
    last_fetch: Option<FetchedSchedule>,

    // Background fetch
    operation_receiver: Option<mpsc::Receiver<FetchEvent>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExportChoice {
    Csv,
    Pdf,
}

impl From<ExportChoice> for ExportFormat {
    fn from(c: ExportChoice) -> Self {
        match c {
            ExportChoice::Csv => ExportFormat::Csv,
            ExportChoice::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Debug)]
enum FetchEvent {
    Progress(usize, usize),
    Done(Result<FetchedSchedule, String>),
}

impl AdhanApp {
    fn new() -> Self {
        let today = Local::now().date_naive();
        Self {
            city: String::new(),
            country: String::new(),
            method: Method::default(),
            year: today.year(),
            month: today.month(),

            export_format: ExportChoice::Csv,
            output_path: ".".to_string(),

            is_loading: false,
            progress: (0, 0),
            status_message: String::new(),
            error_message: String::new(),
            results: String::new(),

            last_fetch: None,
            operation_receiver: None,
        }
    }

    fn form(&self) -> Option<FetchForm> {
        Some(FetchForm {
            city: self.city.clone(),
            country: self.country.clone(),
            method: Some(self.method),
            date: NaiveDate::from_ymd_opt(self.year, self.month, 1)?,
        })
    }

    fn start_fetch(&mut self) {
        let Some(form) = self.form() else {
            self.error_message = format!("Invalid month: {}/{}", self.month, self.year);
            return;
        };
        if let Err(err) = form.validate() {
            self.error_message = err.to_string();
            return;
        }

        self.is_loading = true;
        self.progress = (0, 0);
        self.error_message.clear();
        self.status_message = "Fetching prayer times from the Aladhan API...".to_string();

        let (sender, receiver) = mpsc::channel();
        self.operation_receiver = Some(receiver);
        let out_dir = PathBuf::from(&self.output_path);

        // One worker, one request at a time
        thread::spawn(move || {
            let client = Client::default();
            let progress = sender.clone();
            let result = shell::run_fetch_with_progress(&client, &form, &out_dir, |done, total| {
                let _ = progress.send(FetchEvent::Progress(done, total));
            })
            .map_err(|e| e.to_string());
            let _ = sender.send(FetchEvent::Done(result));
        });
    }

    fn check_fetch_events(&mut self) {
        let Some(receiver) = &self.operation_receiver else {
            return;
        };
        let mut finished = None;
        loop {
            match receiver.try_recv() {
                Ok(FetchEvent::Progress(done, total)) => self.progress = (done, total),
                Ok(FetchEvent::Done(result)) => {
                    finished = Some(result);
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    finished = Some(Err("The fetch stopped unexpectedly.".to_string()));
                    break;
                }
            }
        }

        if let Some(result) = finished {
            self.is_loading = false;
            self.operation_receiver = None;
            match result {
                Ok(fetched) => {
                    self.results = shell::render_schedule(&fetched.schedule);
                    self.status_message = format!(
                        "Prayer times fetched for {} days and saved to {}",
                        fetched.schedule.len(),
                        fetched.json_path.display()
                    );
                    self.error_message.clear();
                    self.last_fetch = Some(fetched);
                }
                Err(error) => {
                    self.error_message = error;
                    self.status_message.clear();
                }
            }
        }
    }

    fn export(&mut self) {
        let out_dir = PathBuf::from(&self.output_path);
        let format: ExportFormat = self.export_format.into();
        match shell::export(self.last_fetch.as_ref(), format, &out_dir) {
            Ok(path) => {
                self.status_message =
                    format!("Data exported to {} ({})", format.label(), path.display());
                self.error_message.clear();
            }
            Err(err) => {
                self.error_message = err.to_string();
                self.status_message.clear();
            }
        }
    }
}

impl eframe::App for AdhanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_fetch_events();

        // Keep polling the worker while a fetch runs
        if self.is_loading {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Monthly Prayer Times Fetcher");
            ui.add_space(10.0);

            ui.group(|ui| {
                ui.label("Location & Method");
                ui.add_space(5.0);

                ui.horizontal(|ui| {
                    ui.label("City:");
                    ui.text_edit_singleline(&mut self.city);
                });

                ui.horizontal(|ui| {
                    ui.label("Country:");
                    ui.text_edit_singleline(&mut self.country);
                });

                ui.horizontal(|ui| {
                    ui.label("Calculation method:");
                    egui::ComboBox::from_id_salt("method")
                        .selected_text(self.method.name())
                        .width(320.0)
                        .show_ui(ui, |ui| {
                            for m in Method::ALL {
                                ui.selectable_value(&mut self.method, m, m.name());
                            }
                        });
                });

                ui.horizontal(|ui| {
                    ui.label("Month:");
                    egui::ComboBox::from_id_salt("month")
                        .selected_text(MONTHS[(self.month as usize).clamp(1, 12) - 1])
                        .show_ui(ui, |ui| {
                            for (i, name) in MONTHS.iter().enumerate() {
                                ui.selectable_value(&mut self.month, i as u32 + 1, *name);
                            }
                        });
                    ui.label("Year:");
                    ui.add(egui::DragValue::new(&mut self.year).range(1900..=2100));
                });
            });

            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!self.is_loading, egui::Button::new("Fetch Prayer Times"))
                    .clicked()
                {
                    self.start_fetch();
                }

                if self.is_loading {
                    ui.spinner();
                    let (done, total) = self.progress;
                    ui.label(format!("Day {}/{}", done, total));
                }
            });

            ui.add_space(10.0);

            ui.group(|ui| {
                ui.label("Export Options");
                ui.add_space(5.0);

                ui.horizontal(|ui| {
                    ui.label("Output path:");
                    ui.text_edit_singleline(&mut self.output_path);
                    if ui.button("Browse").clicked()
                        && let Some(path) = rfd::FileDialog::new().pick_folder()
                    {
                        self.output_path = path.to_string_lossy().to_string();
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Format:");
                    ui.radio_value(&mut self.export_format, ExportChoice::Csv, "CSV");
                    ui.radio_value(&mut self.export_format, ExportChoice::Pdf, "PDF");
                    if ui
                        .add_enabled(!self.is_loading, egui::Button::new("Export Data"))
                        .clicked()
                    {
                        self.export();
                    }
                });
            });

            ui.add_space(10.0);

            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }

            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }

            ui.add_space(5.0);

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&self.results).monospace());
                });
        });
    }
}
