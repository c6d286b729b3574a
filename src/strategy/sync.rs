//! Synchronous report strategy
//!
//! Single-threaded pipeline that streams the transaction log through an
//! `InventoryService` backed by the in-memory repository.
//!
//! # Design
//!
//! The strategy focuses on orchestration, delegating:
//! - Catalog loading to `catalog_loader::load_catalog`
//! - CSV parsing to `TransactionReader` (iterator interface)
//! - Write-path rules and valuation to `InventoryService`
//! - CSV output to `csv_format::write_valuation_csv`

use crate::core::InventoryService;
use crate::io::catalog_loader::load_catalog;
use crate::io::csv_format::write_valuation_csv;
use crate::io::sync_reader::TransactionReader;
use crate::strategy::{ReportRequest, ReportStrategy};
use crate::types::InventoryError;
use std::io::Write;
use tracing::{info, warn};

/// Synchronous report strategy
///
/// ```no_run
/// use inventory_valuation::strategy::{ReportRequest, ReportStrategy, SyncReportStrategy};
/// use inventory_valuation::types::{CostingMethod, DateWindow};
/// use std::path::PathBuf;
///
/// let request = ReportRequest {
///     transactions_path: PathBuf::from("transactions.csv"),
///     products_path: PathBuf::from("products.csv"),
///     method: CostingMethod::Fifo,
///     window: DateWindow::unbounded(),
///     strict: false,
/// };
/// SyncReportStrategy
///     .run(&request, &mut std::io::stdout())
///     .expect("report failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncReportStrategy;

impl ReportStrategy for SyncReportStrategy {
    fn run(&self, request: &ReportRequest, output: &mut dyn Write) -> Result<(), InventoryError> {
        let catalog = load_catalog(&request.products_path)?;
        let mut service = InventoryService::with_catalog(catalog).with_engine(request.engine());

        let reader = TransactionReader::new(&request.transactions_path)?;

        let (mut accepted, mut rejected) = (0usize, 0usize);
        for result in reader {
            match result.and_then(|new| service.record_transaction(new)) {
                Ok(_) => accepted += 1,
                Err(e) => {
                    rejected += 1;
                    warn!(error = %e, "transaction skipped");
                }
            }
        }
        info!(accepted, rejected, "transaction log ingested");

        let rows = service.valuation_report(request.method, request.window)?;
        write_valuation_csv(&rows, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CostingMethod, DateWindow};
    use chrono::NaiveDate;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    const PRODUCTS: &str = "id,name,description,category,sku,min_stock,price,barcode\n\
                            p1,Widget,,tools,W-1,5,0,\n\
                            p2,Gadget,,tools,G-1,0,0,\n";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn request(transactions: &Path, products: &Path, method: CostingMethod) -> ReportRequest {
        ReportRequest {
            transactions_path: transactions.to_path_buf(),
            products_path: products.to_path_buf(),
            method,
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            )
            .unwrap(),
            strict: false,
        }
    }

    #[test]
    fn test_sync_strategy_reference_scenario() {
        let products = create_temp_csv(PRODUCTS);
        let transactions = create_temp_csv(
            "id,product,type,quantity,unit_cost,date,notes\n\
             t1,p1,entry,10,10,2024-01-01,\n\
             t2,p1,entry,5,20,2024-01-02,\n\
             t3,p1,exit,8,,2024-01-03,\n",
        );

        let mut output = Vec::new();
        SyncReportStrategy
            .run(
                &request(transactions.path(), products.path(), CostingMethod::Fifo),
                &mut output,
            )
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "p1,FIFO,2,1,7.0000,120.0000,17.1429,7.0000,false,0.0000"
        );
        assert_eq!(
            lines[2],
            "p2,FIFO,0,0,0.0000,0.0000,0.0000,0.0000,true,0.0000"
        );
    }

    #[test]
    fn test_sync_strategy_skips_rejected_and_malformed_rows() {
        let products = create_temp_csv(PRODUCTS);
        let transactions = create_temp_csv(
            "id,product,type,quantity,unit_cost,date,notes\n\
             t1,p1,entry,2,3,2024-01-01,\n\
             t2,p1,exit,5,,2024-01-02,overdraw\n\
             t3,p1,entry,oops,3,2024-01-03,\n\
             t4,ghost,entry,1,1,2024-01-03,\n\
             t1,p1,entry,9,9,2024-01-04,duplicate\n",
        );

        let mut output = Vec::new();
        SyncReportStrategy
            .run(
                &request(transactions.path(), products.path(), CostingMethod::Weighted),
                &mut output,
            )
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("p1,weighted,1,0,2.0000,6.0000,3.0000,2.0000,true,0.0000"));
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let products = create_temp_csv(PRODUCTS);
        let mut output = Vec::new();

        let result = SyncReportStrategy.run(
            &request(
                &PathBuf::from("nonexistent.csv"),
                products.path(),
                CostingMethod::Lifo,
            ),
            &mut output,
        );

        assert!(matches!(result, Err(InventoryError::FileNotFound { .. })));
        assert!(output.is_empty());
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncReportStrategy>();
    }
}
