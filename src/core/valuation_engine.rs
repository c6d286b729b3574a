//! Inventory valuation engine
//!
//! This module values the remaining stock of one product over a date window
//! under one of three costing conventions:
//!
//! - **FIFO**: entries become lots ordered oldest first; exits consume from the front
//! - **LIFO**: entries become lots ordered newest first; exits consume from the front
//! - **Weighted**: running totals of units and value; each exit is costed at the
//!   average in effect before it is applied
//!
//! # Ordering
//!
//! Entries are stably sorted by timestamp for FIFO/LIFO, so entries sharing a
//! timestamp keep their input order. Exits are never re-sorted: they are applied
//! in input order. The weighted method applies every entry first and every exit
//! second, each in input order, rather than interleaving them chronologically.
//!
//! # Degenerate input
//!
//! The engine assumes the write path kept stock non-negative. When an exit
//! cannot be fully matched (lot queue exhausted, or no units left for the
//! weighted method) the remainder is dropped and added to
//! [`ValuationResult::unsatisfied_quantity`]. A lenient engine (the default)
//! still returns the numeric result; a strict engine reports
//! [`InventoryError::UnsatisfiedExit`] from [`ValuationEngine::try_valuate`].

use crate::types::{
    CostingMethod, DateWindow, InventoryError, Transaction, TransactionKind, ValuationResult,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use tracing::debug;

/// Remaining fragment of an entry during one valuation run
#[derive(Debug, Clone, PartialEq)]
struct Lot {
    quantity_remaining: Decimal,
    unit_cost: Decimal,
    date: NaiveDateTime,
}

impl From<&Transaction> for Lot {
    fn from(entry: &Transaction) -> Self {
        Lot {
            quantity_remaining: entry.quantity,
            unit_cost: entry.unit_cost,
            date: entry.date,
        }
    }
}

/// Figures produced by a single costing method
#[derive(Debug, Clone, Copy, PartialEq)]
struct Totals {
    remaining_stock: Decimal,
    total_cost: Decimal,
    unsatisfied_quantity: Decimal,
}

impl Totals {
    fn average_cost(&self) -> Decimal {
        if self.remaining_stock > Decimal::ZERO {
            self.total_cost / self.remaining_stock
        } else {
            Decimal::ZERO
        }
    }
}

/// Stateless valuation engine
///
/// The only configuration is whether unmatched exit quantity is an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValuationEngine {
    strict: bool,
}

impl ValuationEngine {
    /// Create a lenient engine that never fails
    pub fn new() -> Self {
        ValuationEngine { strict: false }
    }

    /// Create an engine that rejects results with unmatched exit quantity
    pub fn strict() -> Self {
        ValuationEngine { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Value the stock of `product_id` within `window` under `method`
    ///
    /// Transactions of other products, and transactions dated outside the
    /// window, are ignored. The returned `entries`/`exits` are the filtered
    /// input in original order.
    ///
    /// This never fails, even on a strict engine; see [`Self::try_valuate`].
    /// Histories accepted by a repository's `append` stay inside the decimal
    /// range for every method.
    pub fn valuate(
        &self,
        transactions: &[Transaction],
        product_id: &str,
        method: CostingMethod,
        window: DateWindow,
    ) -> ValuationResult {
        let (entries, exits) = partition(transactions, product_id, window);

        let totals = match method {
            CostingMethod::Fifo => consume_lots(&entries, &exits, LotOrder::OldestFirst),
            CostingMethod::Lifo => consume_lots(&entries, &exits, LotOrder::NewestFirst),
            CostingMethod::Weighted => weighted_average(&entries, &exits),
        };

        if !totals.unsatisfied_quantity.is_zero() {
            debug!(
                product = product_id,
                method = %method,
                unsatisfied = %totals.unsatisfied_quantity,
                "exit quantity exceeded available lots"
            );
        }

        ValuationResult {
            entries,
            exits,
            remaining_stock: totals.remaining_stock,
            total_cost: totals.total_cost,
            average_cost: totals.average_cost(),
            unsatisfied_quantity: totals.unsatisfied_quantity,
        }
    }

    /// Value the stock, failing on unmatched exits when the engine is strict
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnsatisfiedExit`] if the engine is strict and
    /// at least one exit could not be fully matched.
    pub fn try_valuate(
        &self,
        transactions: &[Transaction],
        product_id: &str,
        method: CostingMethod,
        window: DateWindow,
    ) -> Result<ValuationResult, InventoryError> {
        let result = self.valuate(transactions, product_id, method, window);

        if self.strict && !result.is_fully_satisfied() {
            return Err(InventoryError::unsatisfied_exit(
                product_id,
                method.tag(),
                result.unsatisfied_quantity,
            ));
        }

        Ok(result)
    }
}

/// Value stock with a lenient engine
///
/// Shorthand for `ValuationEngine::new().valuate(...)`.
pub fn valuate(
    transactions: &[Transaction],
    product_id: &str,
    method: CostingMethod,
    window: DateWindow,
) -> ValuationResult {
    ValuationEngine::new().valuate(transactions, product_id, method, window)
}

/// Keep the product's in-window transactions and split them by kind
fn partition(
    transactions: &[Transaction],
    product_id: &str,
    window: DateWindow,
) -> (Vec<Transaction>, Vec<Transaction>) {
    transactions
        .iter()
        .filter(|tx| tx.product_id == product_id && window.contains(tx.day()))
        .cloned()
        .partition(|tx| tx.kind == TransactionKind::Entry)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LotOrder {
    OldestFirst,
    NewestFirst,
}

/// FIFO/LIFO: build a lot queue and let each exit consume from its front
fn consume_lots(entries: &[Transaction], exits: &[Transaction], order: LotOrder) -> Totals {
    let mut sorted: Vec<Lot> = entries.iter().map(Lot::from).collect();
    // sort_by is stable: equal timestamps keep input order in both directions
    match order {
        LotOrder::OldestFirst => sorted.sort_by(|a, b| a.date.cmp(&b.date)),
        LotOrder::NewestFirst => sorted.sort_by(|a, b| b.date.cmp(&a.date)),
    }

    let mut lots = VecDeque::from(sorted);
    let mut unsatisfied_quantity = Decimal::ZERO;

    for exit in exits {
        let mut needed = exit.quantity;

        while needed > Decimal::ZERO {
            let Some(front) = lots.front_mut() else {
                break;
            };

            if front.quantity_remaining <= needed {
                needed -= front.quantity_remaining;
                lots.pop_front();
            } else {
                front.quantity_remaining -= needed;
                needed = Decimal::ZERO;
            }
        }

        unsatisfied_quantity += needed;
    }

    let remaining_stock: Decimal = lots.iter().map(|lot| lot.quantity_remaining).sum();
    let total_cost: Decimal = lots
        .iter()
        .map(|lot| lot.quantity_remaining * lot.unit_cost)
        .sum();

    Totals {
        remaining_stock,
        total_cost,
        unsatisfied_quantity,
    }
}

/// Weighted average: all entries first, then all exits, each in input order
fn weighted_average(entries: &[Transaction], exits: &[Transaction]) -> Totals {
    let mut total_units = Decimal::ZERO;
    let mut total_value = Decimal::ZERO;
    let mut unsatisfied_quantity = Decimal::ZERO;

    for entry in entries {
        total_units += entry.quantity;
        total_value += entry.quantity * entry.unit_cost;
    }

    for exit in exits {
        if total_units > Decimal::ZERO {
            let current_average = total_value / total_units;
            if exit.quantity > total_units {
                unsatisfied_quantity += exit.quantity - total_units;
            }
            total_value -= exit.quantity * current_average;
            total_units -= exit.quantity;

            // Drop division residue once the stock is exactly exhausted
            if total_units.is_zero() {
                total_value = Decimal::ZERO;
            }
        } else {
            unsatisfied_quantity += exit.quantity;
        }
    }

    Totals {
        remaining_stock: total_units,
        total_cost: total_value,
        unsatisfied_quantity,
    }
}
