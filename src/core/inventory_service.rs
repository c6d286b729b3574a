//! Inventory service
//!
//! This module provides the `InventoryService` that orchestrates the write path
//! and the read-side queries by coordinating the `Catalog`, a
//! `TransactionRepository` and the `ValuationEngine`.
//!
//! The service enforces business rules such as:
//! - Transactions may only reference products present in the catalog
//! - Exits may not exceed current stock (checked by the repository on append)
//! - Products with recorded transactions cannot be deleted

use crate::core::catalog::Catalog;
use crate::core::repository::InMemoryRepository;
use crate::core::stock_projector::{current_stock, is_low_stock};
use crate::core::traits::TransactionRepository;
use crate::core::valuation_engine::ValuationEngine;
use crate::types::{
    CostingMethod, DateWindow, InventoryError, NewTransaction, Product, ProductId,
    ProductValuation, Transaction, ValuationResult,
};
use rust_decimal::Decimal;
use tracing::debug;

/// Inventory orchestration over a pluggable repository
///
/// Defaults to the single-owner `InMemoryRepository`.
pub struct InventoryService<R = InMemoryRepository> {
    catalog: Catalog,
    repository: R,
    engine: ValuationEngine,
}

impl InventoryService<InMemoryRepository> {
    /// Create a service over an empty in-memory repository
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self::new(catalog, InMemoryRepository::new())
    }
}

impl<R: TransactionRepository> InventoryService<R> {
    /// Create a new InventoryService
    ///
    /// # Arguments
    ///
    /// * `catalog` - Products and categories that transactions may reference
    /// * `repository` - Store for the transaction log
    pub fn new(catalog: Catalog, repository: R) -> Self {
        InventoryService {
            catalog,
            repository,
            engine: ValuationEngine::new(),
        }
    }

    /// Use a specific valuation engine, e.g. `ValuationEngine::strict()`
    pub fn with_engine(mut self, engine: ValuationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Record a stock movement
    ///
    /// Assigns a UUID when the request carries no id.
    ///
    /// # Arguments
    ///
    /// * `new` - The transaction to record
    ///
    /// # Returns
    ///
    /// * `Ok(Transaction)` - The stored transaction, with its final id
    /// * `Err(InventoryError)` - The write was rejected and nothing was stored
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The product is not in the catalog
    /// - The quantity or unit cost is invalid
    /// - The transaction id is a duplicate
    /// - The exit exceeds the product's current stock
    pub fn record_transaction(
        &mut self,
        new: NewTransaction,
    ) -> Result<Transaction, InventoryError> {
        self.catalog.require_product(&new.product_id)?;

        let transaction = new.assign_id();
        self.repository.append(transaction.clone())?;

        debug!(
            tx = %transaction.id,
            product = %transaction.product_id,
            kind = ?transaction.kind,
            quantity = %transaction.quantity,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Delete a product that has no recorded transactions
    ///
    /// # Errors
    ///
    /// Returns `ProductHasTransactions` or `ProductNotFound`.
    pub fn delete_product(&mut self, product_id: &str) -> Result<Product, InventoryError> {
        self.catalog.delete_product(product_id, &self.repository)
    }

    /// Current stock of a product over its full history
    pub fn product_stock(&self, product_id: &str) -> Decimal {
        current_stock(&self.repository.list(product_id))
    }

    /// Current stock of every product in a category, sorted by product id
    pub fn category_stock(&self, category_id: &str) -> Vec<(ProductId, Decimal)> {
        self.catalog
            .products_in_category(category_id)
            .map(|product| (product.id.clone(), self.product_stock(&product.id)))
            .collect()
    }

    /// Products whose stock is at or below their minimum, sorted by id
    pub fn low_stock_products(&self) -> Vec<&Product> {
        self.catalog
            .products()
            .filter(|product| is_low_stock(product, &self.repository.list(&product.id)))
            .collect()
    }

    /// A product's transactions whose date falls inside `window`, in append order
    pub fn product_transactions(&self, product_id: &str, window: DateWindow) -> Vec<Transaction> {
        self.repository
            .list(product_id)
            .into_iter()
            .filter(|tx| window.contains(tx.day()))
            .collect()
    }

    /// Value a product's stock inside `window`
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` for an unknown product, and
    /// `UnsatisfiedExit` when the engine is strict and an exit went unmatched.
    pub fn inventory_cost(
        &self,
        product_id: &str,
        method: CostingMethod,
        window: DateWindow,
    ) -> Result<ValuationResult, InventoryError> {
        self.catalog.require_product(product_id)?;

        let transactions = self.repository.list(product_id);
        self.engine
            .try_valuate(&transactions, product_id, method, window)
    }

    /// Value every catalog product, sorted by product id
    ///
    /// # Errors
    ///
    /// Propagates the first strict-mode `UnsatisfiedExit`.
    pub fn valuation_report(
        &self,
        method: CostingMethod,
        window: DateWindow,
    ) -> Result<Vec<ProductValuation>, InventoryError> {
        self.catalog
            .products()
            .map(|product| {
                let history = self.repository.list(&product.id);
                value_product(&self.engine, product, &history, method, window)
            })
            .collect()
    }
}

/// Build one report line from a product's full history
///
/// Shared by the synchronous service and the parallel batch processor so both
/// produce identical rows.
pub fn value_product(
    engine: &ValuationEngine,
    product: &Product,
    history: &[Transaction],
    method: CostingMethod,
    window: DateWindow,
) -> Result<ProductValuation, InventoryError> {
    let valuation = engine.try_valuate(history, &product.id, method, window)?;
    let stock = current_stock(history);

    Ok(ProductValuation {
        product_id: product.id.clone(),
        method,
        valuation,
        current_stock: stock,
        low_stock: stock <= product.min_stock,
    })
}
