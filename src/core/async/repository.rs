//! Thread-safe transaction repository for concurrent batch processing
//!
//! This module provides the `SharedRepository` struct, which stores the
//! transaction log using concurrent data structures so that appends for
//! different products can proceed in parallel.
//!
//! # Design
//!
//! Each product's history lives in its own `DashMap` entry. An append holds
//! that entry's write guard across the stock-sufficiency check and the push,
//! which makes "check stock + append" a single critical section per product.
//! Appends for other products are not blocked.
//!
//! # Change notification
//!
//! Every accepted append is published on a `tokio::sync::broadcast` channel.
//! Subscribers receive transactions in per-product append order. A subscriber
//! that falls more than `EVENT_CAPACITY` events behind observes a lag error
//! from the receiver and skips ahead.

use crate::core::repository::{ensure_sufficient_stock, ensure_within_range, validate_shape};
use crate::core::traits::TransactionRepository;
use crate::types::{InventoryError, ProductId, Transaction, TransactionId};
use dashmap::{DashMap, DashSet};
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered events per subscriber before it starts lagging
pub const EVENT_CAPACITY: usize = 1024;

/// Concurrent append-only transaction log
#[derive(Debug)]
pub struct SharedRepository {
    /// Per-product history in append order
    products: DashMap<ProductId, Vec<Transaction>>,

    /// Ids of accepted transactions
    ids: DashSet<TransactionId>,

    events: broadcast::Sender<Transaction>,
}

impl SharedRepository {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            products: DashMap::new(),
            ids: DashSet::new(),
            events,
        }
    }

    /// Validate and append a transaction
    ///
    /// # Errors
    ///
    /// Same conditions as `TransactionRepository::append`.
    ///
    /// # Concurrency
    ///
    /// The product's entry stays locked from the stock check until the
    /// transaction is pushed and published. When two concurrent appends for
    /// different products share an id, exactly one of them is accepted.
    pub fn append(&self, transaction: Transaction) -> Result<(), InventoryError> {
        validate_shape(&transaction)?;

        let mut history = self
            .products
            .entry(transaction.product_id.clone())
            .or_default();

        if !self.ids.insert(transaction.id.clone()) {
            return Err(InventoryError::duplicate_transaction(
                &transaction.id,
                &transaction.product_id,
            ));
        }

        let checked = ensure_sufficient_stock(&transaction, history.iter())
            .and_then(|()| ensure_within_range(&transaction, history.iter()));
        if let Err(e) = checked {
            self.ids.remove(&transaction.id);
            return Err(e);
        }

        history.push(transaction.clone());

        // No subscribers is not an error
        if self.events.send(transaction).is_err() {
            trace!("append published with no subscribers");
        }

        Ok(())
    }

    /// Snapshot of one product's history in append order
    pub fn list(&self, product_id: &str) -> Vec<Transaction> {
        self.products
            .get(product_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Snapshot of every transaction, grouped by product id in ascending order
    pub fn list_all(&self) -> Vec<Transaction> {
        let mut groups: Vec<(ProductId, Vec<Transaction>)> = self
            .products
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));

        groups.into_iter().flat_map(|(_, txs)| txs).collect()
    }

    /// Receive every transaction accepted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Transaction> {
        self.events.subscribe()
    }

    /// Number of accepted transactions
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for SharedRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionRepository for SharedRepository {
    fn list(&self, product_id: &str) -> Vec<Transaction> {
        SharedRepository::list(self, product_id)
    }

    fn list_all(&self) -> Vec<Transaction> {
        SharedRepository::list_all(self)
    }

    fn append(&mut self, transaction: Transaction) -> Result<(), InventoryError> {
        SharedRepository::append(self, transaction)
    }

    fn has_transactions(&self, product_id: &str) -> bool {
        self.products
            .get(product_id)
            .is_some_and(|entry| !entry.value().is_empty())
    }
}
