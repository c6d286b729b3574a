//! Batch processing with product-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which records batches of
//! transactions concurrently while keeping each product's transactions in
//! order, and values the catalog with one task per product.
//!
//! # Design
//!
//! Stock checks only ever look at a single product's history, so a batch can
//! be split by product id and each sub-batch appended on its own task. Within a
//! sub-batch, transactions are appended strictly in input order, which gives
//! the same accept/reject decisions as a sequential pass over the file.
//!
//! Transaction ids are unique across products, so two products that share an
//! id in the same batch would race for it. Such a batch is cut into segments
//! before the second use of the id, and segments run one after another.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── Arc<SharedRepository>  (thread-safe transaction log)
//!     ├── Arc<Catalog>           (read-only product lookup)
//!     └── ValuationEngine        (pure valuation)
//! ```

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use super::SharedRepository;
use crate::core::catalog::Catalog;
use crate::core::inventory_service::value_product;
use crate::core::valuation_engine::ValuationEngine;
use crate::types::{
    CostingMethod, DateWindow, InventoryError, NewTransaction, ProductId, ProductValuation,
    Transaction,
};
use tracing::error;

/// Outcome of recording a single transaction
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The request as it was read
    pub record: NewTransaction,

    /// The stored transaction, or why it was rejected
    pub result: Result<Transaction, InventoryError>,
}

/// Batch processor with product-based partitioning
///
/// Cheap to clone; clones share the same repository and catalog.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    repository: Arc<SharedRepository>,
    catalog: Arc<Catalog>,
    engine: ValuationEngine,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `repository` - Shared transaction log to append into
    /// * `catalog` - Products that transactions may reference
    pub fn new(repository: Arc<SharedRepository>, catalog: Arc<Catalog>) -> Self {
        Self {
            repository,
            catalog,
            engine: ValuationEngine::new(),
        }
    }

    /// Use a specific valuation engine, e.g. `ValuationEngine::strict()`
    pub fn with_engine(mut self, engine: ValuationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn repository(&self) -> &Arc<SharedRepository> {
        &self.repository
    }

    /// Partition a batch of transactions by product id
    ///
    /// # Guarantees
    ///
    /// - Each transaction appears in exactly one sub-batch
    /// - Transactions for each product keep their original order
    pub fn partition_by_product(
        &self,
        batch: Vec<NewTransaction>,
    ) -> HashMap<ProductId, Vec<NewTransaction>> {
        let mut product_batches: HashMap<ProductId, Vec<NewTransaction>> = HashMap::new();

        for record in batch {
            product_batches
                .entry(record.product_id.clone())
                .or_default()
                .push(record);
        }

        product_batches
    }

    /// Cut a batch so that no segment uses an id under two products
    ///
    /// # Guarantees
    ///
    /// - Segments concatenated give back the batch in its original order
    /// - Within a segment, every explicit id belongs to a single product
    pub fn split_at_shared_ids(&self, batch: Vec<NewTransaction>) -> Vec<Vec<NewTransaction>> {
        let mut segments = Vec::new();
        let mut current: Vec<NewTransaction> = Vec::new();
        let mut owners: HashMap<String, ProductId> = HashMap::new();

        for record in batch {
            if let Some(id) = record.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
                let shared = owners
                    .get(id)
                    .is_some_and(|owner| *owner != record.product_id);
                if shared {
                    segments.push(mem::take(&mut current));
                    owners.clear();
                }
                owners.insert(id.to_string(), record.product_id.clone());
            }
            current.push(record);
        }

        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// Record one transaction
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` for a product outside the catalog, or any
    /// error raised by `SharedRepository::append`.
    pub fn record(&self, record: NewTransaction) -> Result<Transaction, InventoryError> {
        self.catalog.require_product(&record.product_id)?;

        let transaction = record.assign_id();
        self.repository.append(transaction.clone())?;
        Ok(transaction)
    }

    /// Record all transactions for a single product sequentially
    ///
    /// Results are in the same order as the input. A rejected transaction
    /// does not stop the ones after it.
    pub async fn process_product_transactions(
        &self,
        transactions: Vec<NewTransaction>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(transactions.len());

        for record in transactions {
            let result = self.record(record.clone());
            results.push(ProcessingResult { record, result });
        }

        results
    }

    /// Record a batch with one task per product
    ///
    /// Segments from `split_at_shared_ids` run in order, so an id used by two
    /// products goes to the one that comes first in the batch, as in a
    /// sequential pass. Results are grouped by product within each segment.
    pub async fn process_batch(&self, batch: Vec<NewTransaction>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());
        for segment in self.split_at_shared_ids(batch) {
            results.extend(self.process_segment(segment).await);
        }
        results
    }

    async fn process_segment(&self, segment: Vec<NewTransaction>) -> Vec<ProcessingResult> {
        let product_batches = self.partition_by_product(segment);

        let mut tasks = Vec::with_capacity(product_batches.len());
        for (_product_id, transactions) in product_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_product_transactions(transactions).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(product_results) => results.extend(product_results),
                Err(e) => error!(error = %e, "batch task failed"),
            }
        }

        results
    }

    /// Value every catalog product with one task per product
    ///
    /// Rows are returned sorted by product id, matching
    /// `InventoryService::valuation_report`.
    ///
    /// # Errors
    ///
    /// Propagates a strict-mode `UnsatisfiedExit`, or reports a failed task as
    /// an I/O error.
    pub async fn valuation_report(
        &self,
        method: CostingMethod,
        window: DateWindow,
    ) -> Result<Vec<ProductValuation>, InventoryError> {
        let mut tasks = Vec::with_capacity(self.catalog.len());
        for product in self.catalog.products() {
            let product = product.clone();
            let repository = Arc::clone(&self.repository);
            let engine = self.engine;
            tasks.push(tokio::spawn(async move {
                let history = repository.list(&product.id);
                value_product(&engine, &product, &history, method, window)
            }));
        }

        // Catalog iteration is sorted, and tasks are awaited in spawn order
        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let row = task.await.map_err(|e| InventoryError::IoError {
                message: format!("valuation task failed: {e}"),
            })??;
            rows.push(row);
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewProduct, TransactionKind};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn catalog(ids: &[&str]) -> Arc<Catalog> {
        let mut catalog = Catalog::new();
        for id in ids {
            catalog
                .add_product(NewProduct {
                    id: Some(id.to_string()),
                    name: id.to_string(),
                    description: String::new(),
                    category_id: String::new(),
                    sku: id.to_string(),
                    min_stock: dec!(1),
                    price: Decimal::ZERO,
                    barcode: None,
                })
                .unwrap();
        }
        Arc::new(catalog)
    }

    fn record(
        id: &str,
        product: &str,
        kind: TransactionKind,
        quantity: Decimal,
        unit_cost: Decimal,
        d: u32,
    ) -> NewTransaction {
        NewTransaction {
            id: Some(id.to_string()),
            product_id: product.to_string(),
            kind,
            quantity,
            unit_cost,
            date: day(d),
            notes: String::new(),
        }
    }

    fn processor(ids: &[&str]) -> BatchProcessor {
        BatchProcessor::new(Arc::new(SharedRepository::new()), catalog(ids))
    }

    #[test]
    fn test_partition_by_product_preserves_order() {
        use TransactionKind::{Entry, Exit};
        let processor = processor(&["a", "b"]);

        let batch = vec![
            record("1", "a", Entry, dec!(1), dec!(1), 1),
            record("2", "b", Entry, dec!(1), dec!(1), 1),
            record("3", "a", Exit, dec!(1), dec!(0), 2),
        ];

        let partitions = processor.partition_by_product(batch);

        assert_eq!(partitions.len(), 2);
        let a: Vec<&str> = partitions["a"]
            .iter()
            .map(|r| r.id.as_deref().unwrap())
            .collect();
        assert_eq!(a, vec!["1", "3"]);
        assert_eq!(partitions["b"].len(), 1);
    }

    #[tokio::test]
    async fn test_process_batch_applies_per_product_order() {
        use TransactionKind::{Entry, Exit};
        let processor = processor(&["a", "b"]);

        let batch = vec![
            record("1", "a", Entry, dec!(5), dec!(2), 1),
            record("2", "a", Exit, dec!(5), dec!(0), 2),
            // Exit after stock ran out is rejected
            record("3", "a", Exit, dec!(1), dec!(0), 3),
            record("4", "b", Entry, dec!(2), dec!(1), 1),
            record("5", "missing", Entry, dec!(2), dec!(1), 1),
        ];

        let results = processor.process_batch(batch).await;
        assert_eq!(results.len(), 5);

        let mut rejected: Vec<&str> = results
            .iter()
            .filter(|r| r.result.is_err())
            .map(|r| r.record.id.as_deref().unwrap())
            .collect();
        rejected.sort_unstable();
        assert_eq!(rejected, vec!["3", "5"]);

        assert_eq!(processor.repository().len(), 3);
    }

    #[test]
    fn test_split_at_shared_ids() {
        use TransactionKind::Entry;
        let processor = processor(&["a", "b"]);

        let batch = vec![
            record("1", "a", Entry, dec!(1), dec!(1), 1),
            record("2", "a", Entry, dec!(1), dec!(1), 1),
            // Same id, same product: stays in the segment
            record("2", "a", Entry, dec!(1), dec!(1), 2),
            record("3", "b", Entry, dec!(1), dec!(1), 2),
            // Id 1 reused by another product starts a new segment
            record("1", "b", Entry, dec!(1), dec!(1), 3),
            record("4", "a", Entry, dec!(1), dec!(1), 3),
        ];

        let split = processor.split_at_shared_ids(batch);
        let segments: Vec<Vec<&str>> = split
            .iter()
            .map(|segment| {
                segment
                    .iter()
                    .map(|r| r.id.as_deref().unwrap())
                    .collect()
            })
            .collect();

        assert_eq!(segments, vec![vec!["1", "2", "2", "3"], vec!["1", "4"]]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_id_shared_across_products_goes_to_first_in_batch() {
        use TransactionKind::{Entry, Exit};

        for _ in 0..50 {
            let processor = processor(&["a", "b"]);
            let batch = vec![
                record("t1", "b", Entry, dec!(2), dec!(1), 1),
                record("t1", "a", Entry, dec!(7), dec!(1), 1),
                // Rejected for stock, so it leaves its id free
                record("t2", "a", Exit, dec!(9), dec!(0), 2),
                record("t2", "b", Exit, dec!(1), dec!(0), 2),
            ];

            processor.process_batch(batch).await;

            let repo = processor.repository();
            let a: Vec<String> = repo.list("a").into_iter().map(|t| t.id).collect();
            let b: Vec<String> = repo.list("b").into_iter().map(|t| t.id).collect();
            assert!(a.is_empty());
            assert_eq!(b, vec!["t1", "t2"]);
        }
    }

    #[tokio::test]
    async fn test_batches_in_sequence_keep_cross_batch_order() {
        use TransactionKind::{Entry, Exit};
        let processor = processor(&["a"]);

        processor
            .process_batch(vec![record("1", "a", Entry, dec!(3), dec!(1), 1)])
            .await;
        let results = processor
            .process_batch(vec![record("2", "a", Exit, dec!(3), dec!(0), 2)])
            .await;

        assert!(results[0].result.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_valuation_report_sorted_by_product() {
        use TransactionKind::{Entry, Exit};
        let processor = processor(&["c", "a", "b"]);

        processor
            .process_batch(vec![
                record("1", "b", Entry, dec!(10), dec!(10), 1),
                record("2", "b", Entry, dec!(5), dec!(20), 2),
                record("3", "b", Exit, dec!(8), dec!(0), 3),
                record("4", "a", Entry, dec!(1), dec!(4), 1),
            ])
            .await;

        let window = DateWindow::new(day(1).date(), day(28).date()).unwrap();
        let rows = processor
            .valuation_report(CostingMethod::Fifo, window)
            .await
            .unwrap();

        let ids: Vec<&str> = rows.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(rows[1].valuation.remaining_stock, dec!(7));
        assert_eq!(rows[1].valuation.total_cost, dec!(120));
        assert!(rows[2].low_stock);
    }

    #[tokio::test]
    async fn test_strict_report_surfaces_unsatisfied_exit() {
        use TransactionKind::{Entry, Exit};
        let processor = processor(&["a"]).with_engine(ValuationEngine::strict());

        processor
            .process_batch(vec![
                record("1", "a", Entry, dec!(2), dec!(1), 10),
                record("2", "a", Exit, dec!(2), dec!(0), 11),
            ])
            .await;

        // The entry is outside the window but the exit is inside it
        let window = DateWindow::new(day(11).date(), day(28).date()).unwrap();
        let result = processor
            .valuation_report(CostingMethod::Lifo, window)
            .await;

        assert!(matches!(
            result,
            Err(InventoryError::UnsatisfiedExit { .. })
        ));
    }
}
