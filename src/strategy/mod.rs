//! Report strategy module
//!
//! This module defines the Strategy pattern for the complete report pipeline:
//! loading the catalog, ingesting the transaction log through the write path,
//! valuing every product and writing the CSV report. The synchronous and the
//! asynchronous implementation can be selected at runtime and produce the same
//! report for the same input.

use crate::cli::StrategyType;
use crate::core::valuation_engine::ValuationEngine;
use crate::types::{CostingMethod, DateWindow, InventoryError};
use std::io::Write;
use std::path::PathBuf;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncReportStrategy, BatchConfig};
pub use sync::SyncReportStrategy;

/// Everything a report run needs besides the output sink
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    /// Transaction log CSV
    pub transactions_path: PathBuf,

    /// Product catalog CSV
    pub products_path: PathBuf,

    pub method: CostingMethod,
    pub window: DateWindow,

    /// Fail the run when an exit in the window cannot be matched
    pub strict: bool,
}

impl ReportRequest {
    /// The valuation engine matching `strict`
    pub fn engine(&self) -> ValuationEngine {
        if self.strict {
            ValuationEngine::strict()
        } else {
            ValuationEngine::new()
        }
    }
}

/// Report strategy trait for complete report pipelines
pub trait ReportStrategy: Send + Sync {
    /// Run the report described by `request` and write it to `output`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input file cannot be opened (file not found, permission denied)
    /// - The report cannot be written
    /// - The request is strict and an exit went unmatched
    ///
    /// Malformed rows and rejected transactions are logged and skipped; they
    /// never make this method fail.
    fn run(&self, request: &ReportRequest, output: &mut dyn Write) -> Result<(), InventoryError>;
}

/// Create a report strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Which pipeline to run (Sync or Async)
/// * `config` - Optional batch configuration (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ReportStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncReportStrategy),
        StrategyType::Async => Box::new(AsyncReportStrategy::new(config.unwrap_or_default())),
    }
}
