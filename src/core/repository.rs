//! In-memory transaction repository
//!
//! This module provides the single-owner `InMemoryRepository`, an append-only
//! log of stock movements indexed by product. Appends take `&mut self`, so the
//! stock check and the push can never interleave with another writer.
//!
//! # Write-time validation
//!
//! Every append is checked for:
//! - Strictly positive quantity and non-negative unit cost
//! - A transaction id that has not been recorded before
//! - For exits, enough current stock to cover the quantity
//! - For entries, stock and value totals that stay inside the decimal range

use crate::core::stock_projector::current_stock;
use crate::core::traits::TransactionRepository;
use crate::types::{InventoryError, ProductId, Transaction, TransactionId};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Reject transactions whose shape can never be valid
///
/// # Errors
///
/// Returns `InvalidQuantity` for a zero or negative quantity,
/// `InvalidUnitCost` for a negative unit cost and `ArithmeticOverflow` when
/// `quantity * unit_cost` is out of range.
pub fn validate_shape(transaction: &Transaction) -> Result<(), InventoryError> {
    if transaction.quantity <= Decimal::ZERO {
        return Err(InventoryError::invalid_quantity(
            &transaction.id,
            transaction.quantity,
        ));
    }

    if transaction.unit_cost < Decimal::ZERO {
        return Err(InventoryError::invalid_unit_cost(
            &transaction.id,
            transaction.unit_cost,
        ));
    }

    transaction
        .quantity
        .checked_mul(transaction.unit_cost)
        .ok_or_else(|| {
            InventoryError::arithmetic_overflow("entry value", &transaction.product_id)
        })?;

    Ok(())
}

/// Check that an exit does not exceed the stock implied by `history`
///
/// Entries always pass.
pub fn ensure_sufficient_stock<'a, I>(
    transaction: &Transaction,
    history: I,
) -> Result<(), InventoryError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    if transaction.is_entry() {
        return Ok(());
    }

    let available = current_stock(history);
    if available < transaction.quantity {
        return Err(InventoryError::insufficient_stock(
            &transaction.product_id,
            available,
            transaction.quantity,
        ));
    }

    Ok(())
}

/// Check that an entry keeps the product's history valuable without overflow
///
/// Every valuation intermediate is bounded by twice the total entry quantity
/// times the highest entry cost, so that bound must stay in range. Exits
/// pass: they never raise it.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` when the stock total or the value bound
/// would overflow.
pub fn ensure_within_range<'a, I>(
    transaction: &Transaction,
    history: I,
) -> Result<(), InventoryError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    if transaction.is_exit() {
        return Ok(());
    }

    let overflow =
        |operation: &str| InventoryError::arithmetic_overflow(operation, &transaction.product_id);

    let mut total_quantity = transaction.quantity;
    let mut max_cost = transaction.unit_cost;
    for entry in history.into_iter().filter(|tx| tx.is_entry()) {
        total_quantity = total_quantity
            .checked_add(entry.quantity)
            .ok_or_else(|| overflow("stock total"))?;
        max_cost = max_cost.max(entry.unit_cost);
    }

    total_quantity
        .checked_mul(max_cost)
        .and_then(|value| value.checked_mul(Decimal::TWO))
        .ok_or_else(|| overflow("stock value"))?;

    Ok(())
}

/// Append-only transaction log for a single writer
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    /// Every transaction in append order
    log: Vec<Transaction>,

    /// Positions in `log` for each product
    by_product: HashMap<ProductId, Vec<usize>>,

    /// Recorded transaction ids
    ids: HashSet<TransactionId>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Borrowing iterator over one product's transactions in append order
    pub fn iter_product<'a>(
        &'a self,
        product_id: &str,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.by_product
            .get(product_id)
            .into_iter()
            .flatten()
            .map(move |&index| &self.log[index])
    }
}

impl TransactionRepository for InMemoryRepository {
    fn list(&self, product_id: &str) -> Vec<Transaction> {
        self.iter_product(product_id).cloned().collect()
    }

    fn list_all(&self) -> Vec<Transaction> {
        self.log.clone()
    }

    fn append(&mut self, transaction: Transaction) -> Result<(), InventoryError> {
        validate_shape(&transaction)?;

        if self.ids.contains(&transaction.id) {
            return Err(InventoryError::duplicate_transaction(
                &transaction.id,
                &transaction.product_id,
            ));
        }

        ensure_sufficient_stock(&transaction, self.iter_product(&transaction.product_id))?;
        ensure_within_range(&transaction, self.iter_product(&transaction.product_id))?;

        let index = self.log.len();
        self.ids.insert(transaction.id.clone());
        self.by_product
            .entry(transaction.product_id.clone())
            .or_default()
            .push(index);
        self.log.push(transaction);

        Ok(())
    }

    fn has_transactions(&self, product_id: &str) -> bool {
        self.by_product
            .get(product_id)
            .is_some_and(|indices| !indices.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::valuation_engine::valuate;
    use crate::types::{CostingMethod, DateWindow};
    use chrono::{NaiveDate, NaiveDateTime};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_append_and_list_by_product() {
        let mut repo = InMemoryRepository::new();

        repo.append(Transaction::entry("e1", "p1", dec!(5), dec!(2), day(1)))
            .unwrap();
        repo.append(Transaction::entry("e2", "p2", dec!(3), dec!(1), day(1)))
            .unwrap();
        repo.append(Transaction::exit("x1", "p1", dec!(2), day(2)))
            .unwrap();

        let p1: Vec<String> = repo.list("p1").into_iter().map(|t| t.id).collect();
        assert_eq!(p1, vec!["e1", "x1"]);
        assert_eq!(repo.list("p2").len(), 1);
        assert!(repo.list("p3").is_empty());
        assert_eq!(repo.len(), 3);

        let all: Vec<String> = repo.list_all().into_iter().map(|t| t.id).collect();
        assert_eq!(all, vec!["e1", "e2", "x1"]);
    }

    #[test]
    fn test_exit_exceeding_stock_is_rejected() {
        let mut repo = InMemoryRepository::new();
        repo.append(Transaction::entry("e1", "p1", dec!(5), dec!(2), day(1)))
            .unwrap();

        let result = repo.append(Transaction::exit("x1", "p1", dec!(6), day(2)));
        assert_eq!(
            result.unwrap_err(),
            InventoryError::insufficient_stock("p1", dec!(5), dec!(6))
        );

        // Rejected write leaves the log untouched
        assert_eq!(repo.len(), 1);
        assert!(!repo.list_all().iter().any(|t| t.id == "x1"));
    }

    #[test]
    fn test_exit_equal_to_stock_is_accepted() {
        let mut repo = InMemoryRepository::new();
        repo.append(Transaction::entry("e1", "p1", dec!(5), dec!(2), day(1)))
            .unwrap();

        assert!(repo
            .append(Transaction::exit("x1", "p1", dec!(5), day(2)))
            .is_ok());
        assert_eq!(current_stock(repo.iter_product("p1")), Decimal::ZERO);
    }

    #[test]
    fn test_exit_on_unknown_product_is_rejected() {
        let mut repo = InMemoryRepository::new();

        let result = repo.append(Transaction::exit("x1", "p1", dec!(1), day(2)));
        assert!(matches!(
            result,
            Err(InventoryError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let mut repo = InMemoryRepository::new();
        repo.append(Transaction::entry("t1", "p1", dec!(5), dec!(2), day(1)))
            .unwrap();

        let result = repo.append(Transaction::entry("t1", "p2", dec!(9), dec!(9), day(1)));
        assert_eq!(
            result.unwrap_err(),
            InventoryError::duplicate_transaction("t1", "p2")
        );
        assert!(repo.list("p2").is_empty());
        assert_eq!(repo.list("p1")[0].quantity, dec!(5));
    }

    #[rstest]
    #[case::zero_quantity(dec!(0), dec!(1))]
    #[case::negative_quantity(dec!(-2), dec!(1))]
    fn test_invalid_quantity_is_rejected(#[case] quantity: Decimal, #[case] cost: Decimal) {
        let mut repo = InMemoryRepository::new();

        let result = repo.append(Transaction::entry("e1", "p1", quantity, cost, day(1)));
        assert!(matches!(
            result,
            Err(InventoryError::InvalidQuantity { .. })
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_negative_unit_cost_is_rejected() {
        let mut repo = InMemoryRepository::new();

        let result = repo.append(Transaction::entry("e1", "p1", dec!(1), dec!(-0.01), day(1)));
        assert!(matches!(
            result,
            Err(InventoryError::InvalidUnitCost { .. })
        ));
    }

    #[test]
    fn test_zero_unit_cost_entry_is_accepted() {
        let mut repo = InMemoryRepository::new();

        assert!(repo
            .append(Transaction::entry("e1", "p1", dec!(1), dec!(0), day(1)))
            .is_ok());
    }

    fn big(mantissa: i128) -> Decimal {
        Decimal::from_i128_with_scale(mantissa, 0)
    }

    #[test]
    fn test_entry_value_overflow_is_rejected() {
        let mut repo = InMemoryRepository::new();

        let result = repo.append(Transaction::entry(
            "e1",
            "p1",
            big(10i128.pow(20)),
            big(10i128.pow(10)),
            day(1),
        ));
        assert_eq!(
            result.unwrap_err(),
            InventoryError::arithmetic_overflow("entry value", "p1")
        );
        assert!(repo.is_empty());
    }

    #[test]
    fn test_stock_total_overflow_is_rejected() {
        let mut repo = InMemoryRepository::new();
        let half = big(5 * 10i128.pow(28));

        repo.append(Transaction::entry("e1", "p1", half, dec!(0), day(1)))
            .unwrap();
        let result = repo.append(Transaction::entry("e2", "p1", half, dec!(0), day(2)));

        assert_eq!(
            result.unwrap_err(),
            InventoryError::arithmetic_overflow("stock total", "p1")
        );
        assert_eq!(current_stock(repo.iter_product("p1")), half);
    }

    #[test]
    fn test_accepted_large_history_values_without_overflow() {
        let mut repo = InMemoryRepository::new();
        let quantity = big(10i128.pow(14));
        let cost = big(10i128.pow(14));

        for i in 1..=3 {
            repo.append(Transaction::entry(format!("e{i}"), "p1", quantity, cost, day(i)))
                .unwrap();
        }
        // A fourth lot would push 2 * 4e14 * 1e14 past the decimal range
        let result = repo.append(Transaction::entry("e4", "p1", quantity, cost, day(4)));
        assert_eq!(
            result.unwrap_err(),
            InventoryError::arithmetic_overflow("stock value", "p1")
        );

        repo.append(Transaction::exit("x1", "p1", quantity, day(5)))
            .unwrap();
        let history = repo.list("p1");
        for method in [CostingMethod::Fifo, CostingMethod::Lifo, CostingMethod::Weighted] {
            let result = valuate(&history, "p1", method, DateWindow::unbounded());
            assert_eq!(result.remaining_stock, quantity * Decimal::TWO);
            assert_eq!(result.total_cost, big(2 * 10i128.pow(28)));
        }
    }

    #[test]
    fn test_has_transactions() {
        let mut repo = InMemoryRepository::new();
        assert!(!repo.has_transactions("p1"));

        repo.append(Transaction::entry("e1", "p1", dec!(1), dec!(1), day(1)))
            .unwrap();
        assert!(repo.has_transactions("p1"));
        assert!(!repo.has_transactions("p2"));
    }
}
