//! branchkeep - branch manager and scan history from the terminal
//!
//! Accounts and branches live in a hosted JSON store; scans stay in a local file.

mod app;
mod config;
mod session;

use anyhow::Result;
use branchkeep_core::{HttpRecordStore, ScanLog, SimulatedScanner};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use app::{App, ScanHistory};
use config::Config;
use session::Session;

/// branchkeep - branch manager and barcode scan history
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database URL (overrides config and environment)
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in
    Signup(Credentials),
    /// Sign in to an existing account
    Login(Credentials),
    /// Forget the signed-in user
    Logout,
    /// Work with the signed-in user's branches
    #[command(subcommand)]
    Branches(BranchCommand),
    /// Work with the local scan history
    #[command(subcommand)]
    Scan(ScanCommand),
}

#[derive(clap::Args, Debug)]
struct Credentials {
    #[arg(short, long)]
    username: String,

    #[arg(short, long, env = "BRANCHKEEP_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum BranchCommand {
    /// Show all branches
    List,
    /// Add a branch
    Add {
        #[arg(long)]
        name: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },
}

#[derive(Subcommand, Debug)]
enum ScanCommand {
    /// Record a barcode
    Add { barcode: String },
    /// Record a code from the simulated scanner
    Simulate,
    /// Show the history, newest first
    List,
    /// Delete the entry with the given index
    Delete { index: usize },
    /// Delete every entry
    Clear,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env loaded: {}", e);
    }

    let mut config = Config::load(args.config)?;
    config.apply_env();
    if let Some(url) = args.database_url {
        tracing::debug!("Overriding database URL from CLI");
        config.database_url = Some(url);
    }

    match run(args.command, &config) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("❌ {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Directive used when `RUST_LOG` is unset, empty or unparseable.
const DEFAULT_LOG_DIRECTIVE: &str = "branchkeep=info";

fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

fn run(command: Command, config: &Config) -> Result<Vec<String>> {
    match command {
        Command::Signup(c) => connect(config)?.signup(&c.username, &c.password),
        Command::Login(c) => connect(config)?.login(&c.username, &c.password),
        Command::Logout => app::logout(&mut Session::load(&config.session_path)),
        Command::Branches(BranchCommand::List) => connect(config)?.list_branches(),
        Command::Branches(BranchCommand::Add { name, start, end }) => {
            connect(config)?.add_branch(&name, &start, &end)
        }
        Command::Scan(scan) => {
            let mut history = ScanHistory::new(ScanLog::load(&config.scan_log_path));
            match scan {
                ScanCommand::Add { barcode } => history.add(&barcode),
                ScanCommand::Simulate => history.scan_with(&mut SimulatedScanner::new()),
                ScanCommand::List => Ok(history.lines()),
                ScanCommand::Delete { index } => history.delete(index),
                ScanCommand::Clear => history.clear(),
            }
        }
    }
}

/// Build an [`App`] talking to the configured store.
fn connect(config: &Config) -> Result<App<HttpRecordStore>> {
    let store = HttpRecordStore::new(config.require_database_url()?, config.request_timeout())?;
    tracing::debug!("Using store at {}", store.base_url());
    Ok(App::new(store, Session::load(&config.session_path)))
}
