//! Stock Ledger CLI
//!
//! Command-line interface for the inventory ledger and transaction log.
//!
//! # Usage
//!
//! ```bash
//! stock-ledger init
//! stock-ledger upsert P1 Widget 10
//! stock-ledger adjust Sortie P1 4
//! stock-ledger adjust --file batch.json
//! stock-ledger log append Entree P1 10
//! stock-ledger log show
//! stock-ledger --strategy async --worker-threads 4 inventory > inventory.csv
//! ```
//!
//! Tables live in `--data-dir` (or `STOCK_LEDGER_DATA_DIR`), one CSV file per
//! table. Diagnostics go to stderr and are filtered through `RUST_LOG`
//! (default `warn`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid request, unreadable table, I/O failure, etc.)
//! - 2: Batch completed, but some items were rejected

use std::io::Write;
use std::process;
use stock_ledger::cli::{self, CliArgs, Command, LogCommand};
use stock_ledger::io::write_snapshot_csv;
use stock_ledger::strategy;
use stock_ledger::types::InventoryError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_FAILURE: i32 = 1;
const EXIT_PARTIAL: i32 = 2;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = cli::parse_args();

    match run(args) {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

/// Execute one command, returning the process exit code
fn run(args: CliArgs) -> Result<i32, InventoryError> {
    let config = args.to_config();
    let strategy = strategy::create_strategy(args.strategy, &config)?;
    let mut stdout = std::io::stdout().lock();

    match args.command {
        Command::Init => {
            strategy.bootstrap()?;
            Ok(0)
        }
        Command::Inventory => {
            let records = strategy.inventory_snapshot()?;
            write_snapshot_csv(&records, &mut stdout).map_err(|message| InventoryError::Io { message })?;
            Ok(0)
        }
        Command::Upsert {
            product_id,
            name,
            quantity,
        } => {
            strategy.upsert_product(&product_id, &name, quantity)?;
            Ok(0)
        }
        Command::Adjust(movement) => {
            let requests = cli::load_requests(&movement)?;
            let outcome = strategy.record_batch_adjustments(&requests)?;
            for error in outcome.errors() {
                eprintln!("Adjustment rejected: {}", error);
            }
            Ok(if outcome.all_succeeded() { 0 } else { EXIT_PARTIAL })
        }
        Command::Log(LogCommand::Append(movement)) => {
            let requests = cli::load_requests(&movement)?;
            let appended = strategy.append_transactions(&requests)?;
            if appended < requests.len() {
                eprintln!("Skipped {} invalid log entries", requests.len() - appended);
                return Ok(EXIT_PARTIAL);
            }
            Ok(0)
        }
        Command::Log(LogCommand::Show) => {
            for entry in strategy.transaction_log()? {
                let line = serde_json::to_string(&entry).map_err(|e| InventoryError::Io {
                    message: format!("Failed to encode log entry: {}", e),
                })?;
                writeln!(stdout, "{}", line)?;
            }
            Ok(0)
        }
    }
}
