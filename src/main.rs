use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use stash_split::core::{AllocationPlan, Deposit, DepositTracker, Window};
use stash_split::storage::JsonFileStore;
use tracing_subscriber::EnvFilter;

const DEFAULT_DATA_FILE: &str = "investment_log.json";

#[derive(Deserialize, Default)]
struct Config {
    data_file: Option<String>,
    portfolio: Option<BTreeMap<String, f64>>,
}

#[derive(Parser)]
#[command(
    name = "stash-split",
    about = "Track cash deposits split across a fixed portfolio"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new deposit
    Record {
        #[arg(long)]
        amount: f64,
    },
    /// Show per-window averages and lifetime totals
    Stats,
    /// Show the most recent deposits
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete the most recent deposit
    Undo {
        /// Skip the confirmation step and delete immediately
        #[arg(long)]
        yes: bool,
    },
    /// Delete all recorded data
    Reset {
        /// Skip the confirmation step and delete immediately
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug)]
enum CliError {
    InvalidConfig(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn load_config(path: &PathBuf) -> Result<Config, CliError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let data = fs::read_to_string(path).map_err(|e| CliError::InvalidConfig(e.to_string()))?;
    toml::from_str(&data).map_err(|e| CliError::InvalidConfig(e.to_string()))
}

fn default_portfolio() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("ENB".to_string(), 0.07),
        ("PFE".to_string(), 0.07),
        ("Corweave".to_string(), 0.07),
        ("CEG".to_string(), 0.07),
        ("TTWO".to_string(), 0.07),
        ("QQQM".to_string(), 0.35),
        ("BTC/ZCash".to_string(), 0.30),
    ])
}

fn window_title(window: Window) -> &'static str {
    match window {
        Window::Week => "Last 7 days",
        Window::Month => "Last 30 days",
        Window::SixMonths => "Last 6 months",
        Window::Year => "Last year",
    }
}

fn print_deposit(deposit: &Deposit) {
    println!(
        "Recorded {} on {}",
        format_amount(deposit.amount),
        deposit.timestamp.format("%B %d, %Y at %H:%M")
    );
    for (target, amount) in &deposit.allocations {
        let percentage = amount / deposit.amount * 100.0;
        println!("  {target:<15} {percentage:>5.1}%  {}", format_amount(*amount));
    }
}

fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;
    let plan = AllocationPlan::new(cfg.portfolio.unwrap_or_else(default_portfolio))?;
    let store = JsonFileStore::new(cfg.data_file.unwrap_or_else(|| DEFAULT_DATA_FILE.into()));
    let mut tracker = DepositTracker::open(store, plan)?;

    match cli.command {
        Commands::Record { amount } => {
            let deposit = tracker.record(amount)?;
            print_deposit(&deposit);
        }
        Commands::Stats => {
            let stats = tracker.statistics(Utc::now());
            let totals = tracker.totals();
            println!("{:<15} {:>12} {:>10}", "Period", "Avg deposit", "Deposits");
            for window in Window::ALL {
                let ws = stats.window(window);
                println!(
                    "{:<15} {:>12} {:>10}",
                    window_title(window),
                    format_amount(ws.mean),
                    ws.count
                );
            }
            println!(
                "{:<15} {:>12} {:>10}",
                "All time",
                format_amount(stats.all_time.mean),
                stats.all_time.count
            );
            println!();
            println!("Total invested: {}", format_amount(totals.grand_total));
            for (target, amount) in &totals.per_target {
                println!("  {target:<15} {}", format_amount(*amount));
            }
        }
        Commands::History { limit } => {
            let recent = tracker.recent(limit);
            if recent.is_empty() {
                println!("No deposits recorded yet.");
            }
            for deposit in &recent {
                println!(
                    "{}  {}",
                    deposit.timestamp.format("%b %d, %Y %H:%M"),
                    format_amount(deposit.amount)
                );
            }
        }
        Commands::Undo { yes } => match tracker.last() {
            None => println!("No deposits to delete."),
            Some(deposit) => {
                println!(
                    "Most recent deposit: {} on {}",
                    format_amount(deposit.amount),
                    deposit.timestamp.format("%B %d, %Y at %H:%M")
                );
                if yes {
                    tracker.pop_last()?;
                    println!("Last deposit deleted.");
                } else {
                    println!("Re-run with --yes to delete it.");
                }
            }
        },
        Commands::Reset { yes } => {
            if yes {
                tracker.clear()?;
                println!("All data cleared.");
            } else {
                println!("This deletes ALL recorded deposits. Re-run with --yes to confirm.");
            }
        }
    }

    Ok(())
}
