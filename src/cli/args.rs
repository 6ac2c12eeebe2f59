use crate::core::temporal::Locale;
use crate::strategy::{InventoryConfig, DEFAULT_DATA_DIR};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Track stock levels and stock movements in CSV tables
#[derive(Parser, Debug)]
#[command(name = "stock-ledger")]
#[command(about = "Track stock levels and stock movements in CSV tables", long_about = None)]
pub struct CliArgs {
    /// Directory holding the inventory ledger and transaction log files
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "STOCK_LEDGER_DATA_DIR",
        default_value = DEFAULT_DATA_DIR,
        global = true
    )]
    pub data_dir: PathBuf,

    /// Locale used to write and read transaction log dates and times
    #[arg(long = "locale", value_enum, default_value = "en-us", global = true)]
    pub locale: Locale,

    /// Service strategy used to access the tables
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        global = true,
        help = "Service strategy: 'sync' for blocking I/O or 'async' for a tokio runtime"
    )]
    pub strategy: StrategyType,

    /// Worker threads of the async runtime (async mode only)
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        global = true,
        help = "Worker threads of the async runtime (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available service strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create the ledger and log tables if they do not exist
    Init,

    /// Print the reconciled ledger as CSV
    Inventory,

    /// Receive stock for a product, creating it if needed
    Upsert {
        #[arg(value_name = "PRODUCT_ID")]
        product_id: String,
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "QUANTITY", allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Apply Entree/Sortie adjustments to the ledger
    Adjust(MovementArgs),

    /// Read or append to the transaction log
    #[command(subcommand)]
    Log(LogCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum LogCommand {
    /// Append entries to the transaction log
    Append(MovementArgs),

    /// Print the transaction log as JSON lines
    Show,
}

/// A single movement on the command line, or a JSON file of movements
#[derive(Args, Debug, Clone, PartialEq)]
pub struct MovementArgs {
    #[arg(
        value_name = "TYPE",
        required_unless_present = "file",
        requires_all = ["product", "quantity"]
    )]
    pub kind: Option<String>,

    #[arg(value_name = "PRODUCT")]
    pub product: Option<String>,

    #[arg(value_name = "QUANTITY", allow_negative_numbers = true)]
    pub quantity: Option<i64>,

    /// JSON array of {"type", "product", "quantity"} objects
    #[arg(long = "file", value_name = "FILE", conflicts_with_all = ["kind", "product", "quantity"])]
    pub file: Option<PathBuf>,
}

impl CliArgs {
    /// Create an InventoryConfig from CLI arguments
    ///
    /// Invalid values fall back to defaults with a warning.
    pub fn to_config(&self) -> InventoryConfig {
        let default = InventoryConfig::default();
        InventoryConfig::new(
            self.data_dir.clone(),
            self.locale,
            self.worker_threads.unwrap_or(default.worker_threads),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default_strategy(&["program", "inventory"], StrategyType::Sync)]
    #[case::explicit_sync(&["program", "--strategy", "sync", "inventory"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "--strategy", "async", "inventory"], StrategyType::Async)]
    #[case::after_subcommand(&["program", "inventory", "--strategy", "async"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[rstest]
    #[case::default(&["program", "init"], Locale::EnUs)]
    #[case::fr(&["program", "--locale", "fr-fr", "init"], Locale::FrFr)]
    #[case::iso(&["program", "--locale", "iso", "init"], Locale::Iso)]
    fn test_locale_parsing(#[case] args: &[&str], #[case] expected: Locale) {
        assert_eq!(CliArgs::try_parse_from(args).unwrap().locale, expected);
    }

    #[rstest]
    #[case::init(&["program", "init"], Command::Init)]
    #[case::inventory(&["program", "inventory"], Command::Inventory)]
    #[case::upsert(
        &["program", "upsert", "P1", "Widget", "5"],
        Command::Upsert { product_id: "P1".to_string(), name: "Widget".to_string(), quantity: 5 }
    )]
    #[case::upsert_negative(
        &["program", "upsert", "P1", "Widget", "-2"],
        Command::Upsert { product_id: "P1".to_string(), name: "Widget".to_string(), quantity: -2 }
    )]
    #[case::adjust_inline(
        &["program", "adjust", "Sortie", "P1", "4"],
        Command::Adjust(MovementArgs {
            kind: Some("Sortie".to_string()),
            product: Some("P1".to_string()),
            quantity: Some(4),
            file: None,
        })
    )]
    #[case::adjust_file(
        &["program", "adjust", "--file", "batch.json"],
        Command::Adjust(MovementArgs {
            kind: None,
            product: None,
            quantity: None,
            file: Some(PathBuf::from("batch.json")),
        })
    )]
    #[case::log_show(&["program", "log", "show"], Command::Log(LogCommand::Show))]
    #[case::log_append(
        &["program", "log", "append", "Entree", "P2", "1"],
        Command::Log(LogCommand::Append(MovementArgs {
            kind: Some("Entree".to_string()),
            product: Some("P2".to_string()),
            quantity: Some(1),
            file: None,
        }))
    )]
    fn test_command_parsing(#[case] args: &[&str], #[case] expected: Command) {
        assert_eq!(CliArgs::try_parse_from(args).unwrap().command, expected);
    }

    #[rstest]
    #[case::all_defaults(&["program", "init"], num_cpus::get())]
    #[case::custom_threads(&["program", "--worker-threads", "3", "init"], 3)]
    #[case::zero_threads_fall_back(&["program", "--worker-threads", "0", "init"], num_cpus::get())]
    fn test_config_conversion(#[case] args: &[&str], #[case] expected_threads: usize) {
        let config = CliArgs::try_parse_from(args).unwrap().to_config();
        assert_eq!(config.worker_threads, expected_threads);
    }

    #[test]
    fn test_data_dir_option() {
        let parsed = CliArgs::try_parse_from(["program", "--data-dir", "/srv/stock", "init"]).unwrap();
        assert_eq!(parsed.to_config().data_dir, PathBuf::from("/srv/stock"));
    }

    #[rstest]
    #[case::missing_command(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "invalid", "init"])]
    #[case::invalid_locale(&["program", "--locale", "de-de", "init"])]
    #[case::upsert_non_numeric(&["program", "upsert", "P1", "Widget", "lots"])]
    #[case::adjust_partial(&["program", "adjust", "Sortie", "P1"])]
    #[case::adjust_nothing(&["program", "adjust"])]
    #[case::adjust_file_and_inline(&["program", "adjust", "Sortie", "P1", "4", "--file", "b.json"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
