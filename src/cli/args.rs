//! Command-line argument definitions

use crate::logging::LogFormat;
use crate::strategy::{BatchConfig, ReportRequest};
use crate::types::{CostingMethod, DateWindow, InventoryError};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the inventory valuation tool
#[derive(Parser, Debug)]
#[command(name = "inventory-valuation")]
#[command(
    about = "Value inventory over a date window using FIFO, LIFO or weighted-average costing",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the transaction log CSV
    #[arg(value_name = "TRANSACTIONS")]
    pub transactions_file: PathBuf,

    /// Path to the product catalog CSV
    #[arg(long = "products", value_name = "FILE", env = "INVENTORY_PRODUCTS")]
    pub products_file: PathBuf,

    /// First day of the window (inclusive)
    #[arg(long = "start", value_name = "YYYY-MM-DD")]
    pub start: NaiveDate,

    /// Last day of the window (inclusive)
    #[arg(long = "end", value_name = "YYYY-MM-DD")]
    pub end: NaiveDate,

    #[arg(
        long = "method",
        value_name = "METHOD",
        default_value = "weighted",
        env = "INVENTORY_METHOD",
        help = "Costing method: FIFO, LIFO or weighted (case-insensitive)"
    )]
    pub method: CostingMethod,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Pipeline: 'sync' for a single thread or 'async' for batched parallel processing"
    )]
    pub strategy: StrategyType,

    /// Fail when an exit inside the window cannot be matched against stock
    #[arg(long = "strict")]
    pub strict: bool,

    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transactions per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads for the async strategy (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    #[arg(
        long = "log-format",
        value_name = "FORMAT",
        default_value = "text",
        env = "INVENTORY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

/// Report pipeline selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Batch configuration from the optional overrides
    ///
    /// Missing values use the defaults; zero values fall back to the defaults
    /// with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none() && self.max_concurrent_batches.is_none() {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_batches
                .unwrap_or(default.max_concurrent_batches),
        )
    }

    /// Build the report request
    ///
    /// # Errors
    ///
    /// Returns `InvalidWindow` when `--start` is after `--end`.
    pub fn to_request(&self) -> Result<ReportRequest, InventoryError> {
        Ok(ReportRequest {
            transactions_path: self.transactions_file.clone(),
            products_path: self.products_file.clone(),
            method: self.method,
            window: DateWindow::new(self.start, self.end)?,
            strict: self.strict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BASE: [&str; 7] = [
        "program",
        "--products",
        "products.csv",
        "--start",
        "2024-01-01",
        "--end",
        "2024-01-31",
    ];

    fn parse(extra: &[&str]) -> Result<CliArgs, clap::Error> {
        let args: Vec<&str> = BASE.iter().chain(extra).copied().collect();
        CliArgs::try_parse_from(args)
    }

    #[rstest]
    #[case::default_strategy(&["tx.csv"], StrategyType::Async)]
    #[case::explicit_sync(&["--strategy", "sync", "tx.csv"], StrategyType::Sync)]
    #[case::explicit_async(&["--strategy", "async", "tx.csv"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] extra: &[&str], #[case] expected: StrategyType) {
        assert_eq!(parse(extra).unwrap().strategy, expected);
    }

    #[rstest]
    #[case::default_method(&["tx.csv"], CostingMethod::Weighted)]
    #[case::fifo(&["--method", "FIFO", "tx.csv"], CostingMethod::Fifo)]
    #[case::lifo_lowercase(&["--method", "lifo", "tx.csv"], CostingMethod::Lifo)]
    #[case::weighted(&["--method", "weighted", "tx.csv"], CostingMethod::Weighted)]
    fn test_method_parsing(#[case] extra: &[&str], #[case] expected: CostingMethod) {
        assert_eq!(parse(extra).unwrap().method, expected);
    }

    #[rstest]
    #[case::batch_size(&["--batch-size", "2000", "tx.csv"], Some(2000), None)]
    #[case::max_concurrent(&["--max-concurrent", "8", "tx.csv"], None, Some(8))]
    #[case::no_options(&["tx.csv"], None, None)]
    fn test_config_options(
        #[case] extra: &[&str],
        #[case] batch_size: Option<usize>,
        #[case] max_concurrent: Option<usize>,
    ) {
        let parsed = parse(extra).unwrap();
        assert_eq!(parsed.batch_size, batch_size);
        assert_eq!(parsed.max_concurrent_batches, max_concurrent);
    }

    #[rstest]
    #[case::all_defaults(&["tx.csv"], 1000, num_cpus::get())]
    #[case::custom_batch_size(&["--batch-size", "2000", "tx.csv"], 2000, num_cpus::get())]
    #[case::zero_batch_size(&["--batch-size", "0", "tx.csv"], 1000, num_cpus::get())]
    #[case::zero_max_concurrent(&["--max-concurrent", "0", "tx.csv"], 1000, num_cpus::get())]
    fn test_batch_config_conversion(
        #[case] extra: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let config = parse(extra).unwrap().to_batch_config();

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent_batches, expected_max_concurrent);
    }

    #[test]
    fn test_to_request() {
        let request = parse(&["--method", "LIFO", "--strict", "tx.csv"])
            .unwrap()
            .to_request()
            .unwrap();

        assert_eq!(request.transactions_path, PathBuf::from("tx.csv"));
        assert_eq!(request.products_path, PathBuf::from("products.csv"));
        assert_eq!(request.method, CostingMethod::Lifo);
        assert!(request.strict);
        assert_eq!(
            request.window.start(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let args = CliArgs::try_parse_from([
            "program",
            "--products",
            "products.csv",
            "--start",
            "2024-02-01",
            "--end",
            "2024-01-01",
            "tx.csv",
        ])
        .unwrap();

        assert!(matches!(
            args.to_request(),
            Err(InventoryError::InvalidWindow { .. })
        ));
    }

    #[rstest]
    #[case::missing_input(&[])]
    #[case::invalid_strategy(&["--strategy", "invalid", "tx.csv"])]
    #[case::invalid_method(&["--method", "HIFO", "tx.csv"])]
    #[case::invalid_log_format(&["--log-format", "xml", "tx.csv"])]
    fn test_parsing_errors(#[case] extra: &[&str]) {
        assert!(parse(extra).is_err());
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let result = CliArgs::try_parse_from([
            "program",
            "--products",
            "p.csv",
            "--start",
            "01/01/2024",
            "--end",
            "2024-01-31",
            "tx.csv",
        ]);
        assert!(result.is_err());
    }
}
