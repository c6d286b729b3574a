//! Asynchronous batch report strategy
//!
//! Multi-threaded pipeline that reads the transaction log in batches, appends
//! each batch into a `SharedRepository` with one task per product, and values
//! the catalog in parallel.
//!
//! # Architecture
//!
//! ```text
//! AsyncReportStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncTransactionReader (batch CSV reading)
//!     └── BatchProcessor (product partitioning + tasks)
//!         ├── SharedRepository (DashMap transaction log)
//!         └── Catalog (read-only)
//! ```
//!
//! # Ordering
//!
//! Batches are processed one after another, so a product whose transactions
//! span several batches still sees them in file order. Within a batch, only
//! different products run concurrently.

use crate::core::r#async::{BatchProcessor, SharedRepository};
use crate::io::async_reader::AsyncTransactionReader;
use crate::io::catalog_loader::load_catalog;
use crate::io::csv_format::{open_error, write_valuation_csv};
use crate::strategy::{ReportRequest, ReportStrategy};
use crate::types::InventoryError;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for batch processing
///
/// Controls how many transactions are read per batch and the number of
/// worker threads of the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of transactions per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch report strategy
#[derive(Debug, Clone)]
pub struct AsyncReportStrategy {
    config: BatchConfig,
}

impl AsyncReportStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ReportStrategy for AsyncReportStrategy {
    fn run(&self, request: &ReportRequest, output: &mut dyn Write) -> Result<(), InventoryError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| InventoryError::IoError {
                message: format!("Failed to create tokio runtime: {e}"),
            })?;

        let rows = runtime.block_on(async {
            let catalog = Arc::new(load_catalog(&request.products_path)?);
            let repository = Arc::new(SharedRepository::new());
            let processor = BatchProcessor::new(Arc::clone(&repository), catalog)
                .with_engine(request.engine());

            let file = tokio::fs::File::open(&request.transactions_path)
                .await
                .map_err(|e| open_error(&request.transactions_path, e))?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncTransactionReader::new(compat_file);

            let (mut accepted, mut rejected) = (0usize, 0usize);
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }
                debug!(size = batch.len(), "processing batch");

                // Wait for the whole batch before reading the next one
                for processed in processor.process_batch(batch).await {
                    match processed.result {
                        Ok(_) => accepted += 1,
                        Err(e) => {
                            rejected += 1;
                            warn!(error = %e, "transaction skipped");
                        }
                    }
                }
            }
            info!(accepted, rejected, "transaction log ingested");

            processor
                .valuation_report(request.method, request.window)
                .await
        })?;

        write_valuation_csv(&rows, output)
    }
}
