use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use teamdash::options::resolve_years;
use teamdash::report::{self, Dashboard};
use teamdash::{DashboardOptions, Field, ReportFormat, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "teamdash")]
#[command(about = "Filter and aggregate competitor team rosters from CSV", long_about = None)]
struct Args {
    /// CSV file to read (stdin when omitted)
    file: Option<PathBuf>,

    /// Treat the input as a JSON array of objects instead of CSV
    #[arg(long)]
    json: bool,

    /// Filter expression (e.g. '"Firm Name" in ["A"] & "Year Joined" between 2010 and 2020')
    #[arg(short, long)]
    filter: Option<String>,

    /// Start from the dashboard's initial widget selection instead of no selection
    #[arg(long)]
    initial_selection: bool,

    /// Output format for the dashboard report
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Write the filtered rows as CSV to this path
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// JSON config file with dashboard options
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the filter options for FIELD and exit
    #[arg(long, value_name = "FIELD")]
    options: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut options = match &args.config {
        Some(path) => load_options(path)?,
        None => DashboardOptions::default(),
    };
    if let Some(format) = args.format {
        options.format = match format {
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Text => ReportFormat::Text,
        };
    }

    let session = load_session(args.file.as_deref(), args.json)?;

    if let Some(field) = &args.options {
        return print_options(&session, field);
    }

    let base = if args.initial_selection {
        session.initial_filter(&options.selection)
    } else {
        session.default_filter()
    };
    let spec = match &args.filter {
        Some(expr) => session
            .parse_filter(expr, base)
            .context("Failed to parse filter expression")?,
        None => base,
    };

    if let Some(path) = &args.export {
        let bytes = session.export(&spec).context("Failed to export filtered data")?;
        fs::write(path, bytes)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        info!(path = %path.display(), "exported filtered data");
    }

    let dashboard = session.dashboard(&spec, options.preview_rows);
    if let Dashboard::Empty { notice } = &dashboard {
        eprintln!("Warning: {}", notice);
    }

    let rendered = match options.format {
        ReportFormat::Json => {
            serde_json::to_string_pretty(&dashboard).context("Failed to serialize report")? + "\n"
        }
        ReportFormat::Text => report::render_text(&dashboard),
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(rendered.as_bytes())
        .context("Failed to write report to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_options(path: &Path) -> Result<DashboardOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_session(file: Option<&Path>, json: bool) -> Result<Session> {
    match (file, json) {
        (Some(path), false) => {
            let reader = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Session::from_csv(BufReader::new(reader)).context("Failed to read CSV")
        }
        (None, false) => {
            let table = teamdash::csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?;
            Ok(Session::new(table))
        }
        (Some(path), true) => {
            let reader = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let value: serde_json::Value =
                serde_json::from_reader(BufReader::new(reader)).context("Failed to read JSON")?;
            Session::from_json(&value).context("Failed to read JSON table")
        }
        (None, true) => {
            let value: serde_json::Value =
                serde_json::from_reader(io::stdin().lock()).context("Failed to read JSON from stdin")?;
            Session::from_json(&value).context("Failed to read JSON table")
        }
    }
}

fn print_options(session: &Session, field: &str) -> Result<()> {
    let rendered = if field == Field::YearJoined.name() {
        serde_json::to_string(&resolve_years(session.dataset()))?
    } else {
        let fallback = (field == Field::FirmName.name()).then(|| Field::FirmName.default_value());
        serde_json::to_string(&session.options_for(field, fallback))?
    };
    println!("{}", rendered);
    Ok(())
}
