//! `portfolio` command-line front end.
//!
//! # Responsibility
//! - Parse subcommands and global overrides.
//! - Resolve configuration, start logging and open the configured store.
//! - Report failures on stderr with a remediation hint and a non-zero exit.

mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use cmd::{company::CompanySubcommand, update::UpdateSubcommand};
use context::Context;
use log::{error, info};
use portfolio_core::{ExportFormat, ServiceError, StoreBackend, StoreError};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(
    name = "portfolio",
    about = "Portfolio update CRM: onboard companies, collect updates, track due dates",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./portfolio.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory; overrides config and PORTFOLIO_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Store backend: json, csv or sqlite
    #[arg(long, global = true)]
    backend: Option<StoreBackend>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Onboard and manage portfolio companies
    Company {
        #[command(subcommand)]
        subcommand: CompanySubcommand,
    },

    /// Submit, browse and render company updates
    Update {
        #[command(subcommand)]
        subcommand: UpdateSubcommand,
    },

    /// Headline counts and per-company due status
    Dashboard,

    /// Companies that are overdue or due within a week
    Reminders,

    /// Export updates as JSON or CSV
    Export {
        /// json or csv
        #[arg(long, default_value = "json")]
        format: ExportFormat,

        /// Restrict to one company (name or id)
        #[arg(long)]
        company: Option<String>,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Company { .. } => "company",
            Self::Update { .. } => "update",
            Self::Dashboard => "dashboard",
            Self::Reminders => "reminders",
            Self::Export { .. } => "export",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        if let Some(hint) = remediation(&e) {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::load(cli.config.as_deref(), cli.data_dir, cli.backend, cli.json)?;
    let command = cli.command.name();
    let started_at = Instant::now();

    let result = match cli.command {
        Commands::Company { subcommand } => cmd::company::run(&ctx, subcommand),
        Commands::Update { subcommand } => cmd::update::run(&ctx, subcommand),
        Commands::Dashboard => cmd::dashboard::run_dashboard(&ctx),
        Commands::Reminders => cmd::dashboard::run_reminders(&ctx),
        Commands::Export {
            format,
            company,
            out,
        } => cmd::export::run(&ctx, format, company.as_deref(), out.as_deref()),
    };

    match &result {
        Ok(()) => info!(
            "event=cli_command module=cli status=ok command={} duration_ms={}",
            command,
            started_at.elapsed().as_millis()
        ),
        Err(_) => error!(
            "event=cli_command module=cli status=error command={} duration_ms={}",
            command,
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn remediation(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<ServiceError>()
            .map(ServiceError::remediation)
            .or_else(|| cause.downcast_ref::<StoreError>().map(StoreError::remediation))
    })
}
