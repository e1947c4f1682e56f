use anyhow::Result;
use adhan_rs::shell::{self, FetchForm};
use adhan_rs::{Client, ExportFormat, Method};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "adhan",
    version,
    about = "Fetch a month of prayer times from the Aladhan API and export them"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a month of prayer times (always saved as JSON).
    Get(GetArgs),
    /// List the supported calculation methods.
    Methods,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Csv,
    Pdf,
}

impl From<OutFormat> for ExportFormat {
    fn from(f: OutFormat) -> Self {
        match f {
            OutFormat::Csv => ExportFormat::Csv,
            OutFormat::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Args, Debug)]
struct GetArgs {
    /// City name (e.g., Cairo)
    #[arg(long)]
    city: String,
    /// Country name (e.g., Egypt)
    #[arg(long)]
    country: String,
    /// Calculation method: slug, code or full name (see `adhan methods`).
    #[arg(short, long, default_value = "isna")]
    method: Method,
    /// Month as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<String>,
    /// Additional export formats besides JSON (repeatable).
    #[arg(short, long, value_enum)]
    format: Vec<OutFormat>,
    /// Directory for the exported files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Do not print the schedule to stdout.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
    /// API root, for pointing at a mirror or a local server.
    #[arg(long, hide = true, default_value = "https://api.aladhan.com/v1")]
    api_url: String,
}

fn parse_month(s: &str) -> Option<NaiveDate> {
    let (y, m) = s.trim().split_once('-')?;
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Get(args) => cmd_get(args),
        Command::Methods => {
            for m in Method::ALL {
                println!("{:>2}  {:<9} {}", m.code(), m.slug(), m.name());
            }
            Ok(())
        }
    }
}

fn cmd_get(args: GetArgs) -> Result<()> {
    let date = match &args.month {
        Some(s) => {
            parse_month(s).ok_or_else(|| anyhow::anyhow!("invalid --month, expected YYYY-MM"))?
        }
        None => {
            let today = Local::now().date_naive();
            today.with_day(1).unwrap_or(today)
        }
    };
    let form = FetchForm {
        city: args.city,
        country: args.country,
        method: Some(args.method),
        date,
    };

    let client = Client::with_base_url(args.api_url);
    let fetched = shell::run_fetch(&client, &form, &args.out_dir)?;
    if !args.quiet {
        print!("{}", shell::render_schedule(&fetched.schedule));
    }
    eprintln!(
        "Saved {} days to {}",
        fetched.schedule.len(),
        fetched.json_path.display()
    );

    for f in args.format {
        let path = shell::export(Some(&fetched), f.into(), &args.out_dir)?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
