//! saju CLI
//!
//! Form front-end for the four-pillars calculator: takes birth details as
//! flags, prints or exports the reading.
//!
//! # Modes
//!
//! - **Local** (default): full pipeline in-process
//! - **Remote** (`--remote URL`, feature `remote`): calculate and analyze via a backend
//! - **Serve** (`--serve [ADDR]`, feature `server`): run the HTTP backend

// Exclude from coverage - CLI binary tested via integration tests
#![cfg_attr(tarpaulin, ignore)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use saju::{
    export_filename, AggregationMode, BirthForm, FormValue, HourInput, OutputFormat, SajuConfig,
    SajuEngine,
};

/// Four Pillars (사주) calculator
#[derive(Parser, Debug)]
#[command(name = "saju")]
#[command(version = saju::VERSION)]
#[command(about = "Four Pillars (사주) calculator")]
#[command(after_help = "EXAMPLES:
  # Reading for 1990-05-15 14:00 (solar)
  saju --name 홍길동 --year 1990 --month 5 --day 15 --hour 14

  # Traditional hour name, Markdown export to 홍길동_사주분석.md
  saju --name 홍길동 --year 1990 --month 5 --day 15 --hour 未時 --format markdown --export

  # Stems only, strict year range
  saju --year 2024 --month 2 --day 29 --hour 0 --stems-only --max-year 2100
")]
struct Cli {
    // ═══════════════════════════════════════════════════════════════════════════
    // BIRTH DETAILS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Name shown on the reading
    #[arg(long = "name", value_name = "NAME", default_value = "", help_heading = "BIRTH DETAILS")]
    name: String,

    /// Birth year (1900 or later)
    #[arg(long = "year", value_name = "YYYY", help_heading = "BIRTH DETAILS")]
    year: Option<String>,

    /// Birth month (1-12)
    #[arg(long = "month", value_name = "MM", help_heading = "BIRTH DETAILS")]
    month: Option<String>,

    /// Birth day of month
    #[arg(long = "day", value_name = "DD", help_heading = "BIRTH DETAILS")]
    day: Option<String>,

    /// Birth hour: 0-23, HH:MM, or a traditional block name (子, 未時, 자시)
    #[arg(long = "hour", value_name = "HOUR", help_heading = "BIRTH DETAILS")]
    hour: Option<String>,

    /// The date is a lunar calendar date
    #[arg(long = "lunar", help_heading = "BIRTH DETAILS")]
    lunar: bool,

    /// Gender [male, female, 남, 여]
    #[arg(long = "gender", value_name = "GENDER", help_heading = "BIRTH DETAILS")]
    gender: Option<String>,

    /// Birth place
    #[arg(long = "location", value_name = "PLACE", help_heading = "BIRTH DETAILS")]
    location: Option<String>,

    // ═══════════════════════════════════════════════════════════════════════════
    // OUTPUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text", help_heading = "OUTPUT")]
    format: OutputFormatArg,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE", help_heading = "OUTPUT")]
    output: Option<PathBuf>,

    /// Write to {name}_사주분석.{ext} in the current directory
    #[arg(long = "export", conflicts_with = "output", help_heading = "OUTPUT")]
    export: bool,

    // ═══════════════════════════════════════════════════════════════════════════
    // CALCULATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Narrative content JSON (default: built-in)
    #[arg(long = "content", value_name = "FILE", help_heading = "CALCULATION")]
    content: Option<PathBuf>,

    /// Config file (default: ./.saju_config.json)
    #[arg(short = 'c', long = "config", value_name = "FILE", help_heading = "CALCULATION")]
    config: Option<PathBuf>,

    /// Count stems only in the element balance
    #[arg(long = "stems-only", help_heading = "CALCULATION")]
    stems_only: bool,

    /// Reject birth years after this one
    #[arg(long = "max-year", value_name = "YYYY", help_heading = "CALCULATION")]
    max_year: Option<i32>,

    // ═══════════════════════════════════════════════════════════════════════════
    // BACKEND
    // ═══════════════════════════════════════════════════════════════════════════

    /// Calculate through a backend at this base URL
    #[cfg(feature = "remote")]
    #[arg(long = "remote", value_name = "URL", help_heading = "BACKEND")]
    remote: Option<String>,

    /// Run the HTTP backend (default address from config)
    #[cfg(feature = "server")]
    #[arg(
        long = "serve",
        value_name = "ADDR",
        num_args = 0..=1,
        default_missing_value = "",
        help_heading = "BACKEND"
    )]
    serve: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    #[value(alias = "txt")]
    Text,
    #[value(alias = "md")]
    Markdown,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => OutputFormat::Text,
            OutputFormatArg::Markdown => OutputFormat::Markdown,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    fn form(&self) -> BirthForm {
        BirthForm {
            name: self.name.clone(),
            birth_year: self.year.clone().map(FormValue::Text),
            birth_month: self.month.clone().map(FormValue::Text),
            birth_day: self.day.clone().map(FormValue::Text),
            birth_hour: self.hour.clone().map(HourInput::Text),
            is_lunar: self.lunar,
            gender: self.gender.clone(),
            location: self.location.clone(),
        }
    }

    /// Config file, then SAJU_* environment, then flags
    fn load_config(&self) -> anyhow::Result<SajuConfig> {
        let mut config = SajuConfig::discover(self.config.as_deref())
            .context("loading configuration")?
            .with_env_overrides();
        if let Some(path) = &self.content {
            config = config.with_content_path(path);
        }
        if let Some(max_year) = self.max_year {
            config = config.with_max_year(max_year);
        }
        if self.stems_only {
            config = config.with_aggregation(AggregationMode::StemsOnly);
        }
        #[cfg(feature = "remote")]
        if let Some(url) = &self.remote {
            config.remote_url = Some(url.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit(cli: &Cli, name: &str, format: OutputFormat, output: &str) -> anyhow::Result<()> {
    let path = match (&cli.output, cli.export) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(export_filename(name, format))),
        (None, false) => None,
    };
    match path {
        Some(path) => {
            std::fs::write(&path, output).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Saved {}", path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

#[cfg(feature = "server")]
fn serve(addr: &str, config: SajuConfig) -> anyhow::Result<()> {
    let addr = if addr.is_empty() {
        config.server_addr.clone()
    } else {
        addr.to_string()
    };
    let engine = SajuEngine::from_config(config);
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(saju::server::serve(&addr, engine))?;
    Ok(())
}

#[cfg(feature = "remote")]
fn calculate_remote(cli: &Cli, client: &saju::remote::RemoteCalculator) -> anyhow::Result<()> {
    tracing::info!(backend = client.base_url(), "Calculating via remote backend");
    let form = cli.form();
    let pillars = client.calculate(&form)?;
    let narrative = client.analyze(&pillars)?;

    let format: OutputFormat = cli.format.into();
    let output = match format {
        OutputFormat::Json => {
            let value = serde_json::json!({ "pillars": pillars, "narrative": narrative });
            serde_json::to_string_pretty(&value)? + "\n"
        }
        _ => {
            let mut text = String::new();
            for (position, pillar) in pillars.entries() {
                text.push_str(&format!("{}  {}\n", position.label(), pillar));
            }
            for (section, body) in narrative.iter() {
                text.push_str(&format!("\n[{}]\n{}\n", section.title(), body));
            }
            text
        }
    };
    emit(cli, &form.name, format, &output)
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;

    #[cfg(feature = "server")]
    if let Some(addr) = &cli.serve {
        return serve(addr, config);
    }

    #[cfg(feature = "remote")]
    if let Some(client) = saju::remote::RemoteCalculator::from_config(&config) {
        return calculate_remote(&cli, &client);
    }

    let engine = SajuEngine::from_config(config);
    let form = cli.form();
    let reading = engine.calculate(&form)?;

    let format: OutputFormat = cli.format.into();
    let output = format.serializer().serialize(&reading)?;
    emit(&cli, &reading.profile.name, format, &output)
}

pub fn run() {
    // Fix broken pipe panic when piping to head/tail/etc.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    let cli = Cli::parse();
    init_logging();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn main() {
    run();
}
