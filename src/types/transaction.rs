//! Transaction-related types for the inventory valuation engine
//!
//! This module defines stock movements (entries and exits) and the identifiers
//! used to reference transactions and products.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product identifier
///
/// Opaque lookup key. Products created from a SKU use the SKU itself.
pub type ProductId = String;

/// Transaction identifier
pub type TransactionId = String;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Goods received into stock at a known unit cost
    Entry,

    /// Goods leaving stock
    ///
    /// Exits carry no intrinsic cost. Their cost is derived from the remaining
    /// lots when a valuation is computed.
    Exit,
}

/// An immutable stock movement for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: TransactionId,

    /// The product this movement belongs to
    pub product_id: ProductId,

    /// Entry or exit
    pub kind: TransactionKind,

    /// Units moved; always strictly positive
    pub quantity: Decimal,

    /// Cost per unit; only meaningful for entries
    pub unit_cost: Decimal,

    /// When the movement happened
    ///
    /// A bare calendar date is stored as midnight.
    pub date: NaiveDateTime,

    /// Free text with no effect on stock or valuation
    pub notes: String,
}

impl Transaction {
    /// Build an entry transaction
    pub fn entry(
        id: impl Into<TransactionId>,
        product_id: impl Into<ProductId>,
        quantity: Decimal,
        unit_cost: Decimal,
        date: NaiveDateTime,
    ) -> Self {
        Transaction {
            id: id.into(),
            product_id: product_id.into(),
            kind: TransactionKind::Entry,
            quantity,
            unit_cost,
            date,
            notes: String::new(),
        }
    }

    /// Build an exit transaction
    pub fn exit(
        id: impl Into<TransactionId>,
        product_id: impl Into<ProductId>,
        quantity: Decimal,
        date: NaiveDateTime,
    ) -> Self {
        Transaction {
            id: id.into(),
            product_id: product_id.into(),
            kind: TransactionKind::Exit,
            quantity,
            unit_cost: Decimal::ZERO,
            date,
            notes: String::new(),
        }
    }

    /// Attach notes to the transaction
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Calendar day of the movement, ignoring time of day
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Whether this movement adds stock
    pub fn is_entry(&self) -> bool {
        self.kind == TransactionKind::Entry
    }

    /// Whether this movement removes stock
    pub fn is_exit(&self) -> bool {
        self.kind == TransactionKind::Exit
    }
}

/// A transaction that has not been assigned an identifier yet
///
/// The write path fills in a fresh id when `id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub id: Option<TransactionId>,
    pub product_id: ProductId,
    pub kind: TransactionKind,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub date: NaiveDateTime,
    pub notes: String,
}

impl NewTransaction {
    /// Turn the request into a stored transaction with the given id
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            product_id: self.product_id,
            kind: self.kind,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            date: self.date,
            notes: self.notes,
        }
    }
}

impl From<Transaction> for NewTransaction {
    fn from(tx: Transaction) -> Self {
        NewTransaction {
            id: Some(tx.id),
            product_id: tx.product_id,
            kind: tx.kind,
            quantity: tx.quantity,
            unit_cost: tx.unit_cost,
            date: tx.date,
            notes: tx.notes,
        }
    }
}

impl NewTransaction {
    /// Keep the requested id, or generate a random UUID when none was given
    pub fn assign_id(self) -> Transaction {
        let id = match &self.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        self.into_transaction(id)
    }
}
