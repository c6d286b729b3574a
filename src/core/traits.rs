//! Core traits for transaction persistence
//!
//! This module defines the seam between the inventory core and the store that
//! holds the transaction log, so that the single-owner and the thread-safe
//! repositories can be used interchangeably by the service layer.

use crate::types::{InventoryError, Transaction};

/// Trait for storing and retrieving the transaction log
///
/// Implementations must make the stock-sufficiency check for an exit and the
/// append itself a single atomic step with respect to other appends for the
/// same product.
pub trait TransactionRepository {
    /// Snapshot of one product's transactions, in append order
    fn list(&self, product_id: &str) -> Vec<Transaction>;

    /// Snapshot of every stored transaction
    fn list_all(&self) -> Vec<Transaction>;

    /// Validate and append a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The quantity is not strictly positive or the unit cost is negative
    /// - The transaction id was already recorded
    /// - The transaction is an exit larger than the product's current stock
    fn append(&mut self, transaction: Transaction) -> Result<(), InventoryError>;

    /// Whether any transaction references the product
    fn has_transactions(&self, product_id: &str) -> bool {
        !self.list(product_id).is_empty()
    }
}
