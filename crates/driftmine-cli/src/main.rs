//! Driftmine CLI - stream frequent-itemset mining with drift-adaptive windows.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use driftmine_core::{
    sample_dataset, split, transaction_from_line, MinerConfig, PaneReport, Transaction,
    WindowController,
};

#[derive(Parser)]
#[command(name = "driftmine")]
#[command(version = "0.1.0")]
#[command(about = "Streaming frequent-itemset mining with concept-drift detection", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in drifting demo dataset
    Demo {
        #[command(flatten)]
        mining: MiningArgs,
    },

    /// Mine a transaction file (one transaction per line, items whitespace-separated)
    Run {
        /// Path to the transaction file
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        mining: MiningArgs,
    },
}

#[derive(Args)]
struct MiningArgs {
    /// Transactions per pane
    #[arg(long, default_value = "5")]
    pane_size: usize,

    /// Minimum support for frequent itemsets
    #[arg(long, default_value = "2")]
    min_support: u64,

    /// Drift trigger threshold in (0, 1]
    #[arg(long, default_value = "0.3")]
    drift_threshold: f64,

    /// Initial window width in panes
    #[arg(long, default_value = "1")]
    window_panes: usize,

    /// Longest itemset to mine
    #[arg(long, default_value = "3")]
    max_length: usize,

    /// Cap on window growth in panes (unbounded when omitted)
    #[arg(long)]
    max_window: Option<usize>,

    /// Show at most this many itemsets per pane
    #[arg(long, default_value = "10")]
    top: usize,

    /// Emit reports as JSON lines instead of text
    #[arg(long)]
    json: bool,
}

impl MiningArgs {
    fn config(&self) -> MinerConfig {
        MinerConfig {
            pane_size: self.pane_size,
            min_support: self.min_support,
            drift_threshold: self.drift_threshold,
            initial_window_panes: self.window_panes,
            max_itemset_length: self.max_length,
            max_window_panes: self.max_window,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    match cli.command {
        Commands::Demo { mining } => {
            info!("running built-in demo dataset");
            mine_stream(sample_dataset(), &mining)
        }
        Commands::Run { file, mining } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let transactions: Vec<Transaction> = raw
                .lines()
                .map(transaction_from_line)
                .filter(|t| !t.is_empty())
                .collect();
            info!(
                "loaded {} transactions from {}",
                transactions.len(),
                file.display()
            );
            mine_stream(transactions, &mining)
        }
    }
}

fn mine_stream(transactions: Vec<Transaction>, args: &MiningArgs) -> Result<()> {
    let config = args.config();
    let pane_size = config.pane_size;
    let mut controller = WindowController::new(config).context("invalid configuration")?;

    for pane in split(&transactions, pane_size) {
        let report = controller.process_pane(pane);
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(&report, args.top);
        }
    }

    if !args.json {
        print_timeline(controller.drift_history());
    }
    Ok(())
}

fn print_report(report: &PaneReport, top: usize) {
    println!(
        "pane {} (tids {}..{}): drift ratio {:.2}{}",
        report.pane_index,
        report.first_tid,
        report.first_tid + report.transactions as u64,
        report.drift.ratio,
        if report.shrunk {
            ", window shrunk"
        } else {
            ", window grows"
        }
    );
    for itemset in report.itemsets.iter().take(top) {
        println!("  {} -> {}", itemset.items.join(", "), itemset.support);
    }
}

fn print_timeline(history: &[driftmine_core::DriftRecord]) {
    println!("\ndrift timeline:");
    for record in history {
        println!(
            "  pane {:>3}  ratio {:.2}  {}",
            record.pane_index,
            record.ratio,
            if record.triggered { "DRIFT" } else { "-" }
        );
    }
}
