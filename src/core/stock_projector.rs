//! Net stock projection
//!
//! Computes a product's current stock from its transaction history. The
//! projection is a plain sum, so input order never matters and no sort is
//! performed. It does not clamp: a negative result is reported as is so that
//! callers can detect an inconsistent log.

use crate::types::{Product, Transaction, TransactionKind};
use rust_decimal::Decimal;

/// Net stock implied by `transactions`: entries minus exits
///
/// Callers pass the full, unfiltered history of a single product.
pub fn current_stock<'a, I>(transactions: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .fold(Decimal::ZERO, |stock, tx| match tx.kind {
            TransactionKind::Entry => stock + tx.quantity,
            TransactionKind::Exit => stock - tx.quantity,
        })
}

/// Whether the product's stock is at or below its minimum
///
/// Equality counts as low.
pub fn is_low_stock<'a, I>(product: &Product, transactions: I) -> bool
where
    I: IntoIterator<Item = &'a Transaction>,
{
    current_stock(transactions) <= product.min_stock
}
