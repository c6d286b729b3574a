//! Error types for the inventory valuation engine
//!
//! This module defines all error types that can occur while recording stock
//! movements, maintaining the catalog, and producing reports.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, invalid dates or amounts, etc.
//! - **Write Path Errors**: Invalid transaction shape, insufficient stock, duplicates
//! - **Catalog Errors**: Unknown products or categories, referential guards
//! - **Valuation Errors**: Unsatisfied exits (strict mode only), invalid windows

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the inventory valuation engine
///
/// The valuation engine itself never produces these in its default lenient
/// mode; they come from the write path, the catalog, and the I/O layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unrecognised costing method tag
    #[error("Invalid costing method '{method}' (expected FIFO, LIFO or weighted)")]
    InvalidMethod { method: String },

    /// Reporting window whose start lies after its end
    #[error("Invalid date window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    /// Quantity is zero or negative
    #[error("Invalid quantity {quantity} for transaction {tx}")]
    InvalidQuantity { tx: String, quantity: Decimal },

    /// Unit cost is negative
    #[error("Invalid unit cost {unit_cost} for transaction {tx}")]
    InvalidUnitCost { tx: String, unit_cost: Decimal },

    /// Exit larger than the product's current stock
    ///
    /// This is a recoverable error - the exit is rejected and the
    /// transaction log remains unchanged.
    #[error(
        "Insufficient stock for product {product}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product: String,
        available: Decimal,
        requested: Decimal,
    },

    /// A stock or value total would exceed the decimal range
    ///
    /// This is a recoverable error - the transaction is rejected so that
    /// valuing the product's history can never overflow.
    #[error("Arithmetic overflow in {operation} for product {product}")]
    ArithmeticOverflow { operation: String, product: String },

    /// Transaction id already recorded
    #[error("Duplicate transaction ID {tx} for product {product}")]
    DuplicateTransaction { tx: String, product: String },

    /// Product id not present in the catalog
    #[error("Product {product} not found")]
    ProductNotFound { product: String },

    /// Product id already present in the catalog
    #[error("Duplicate product ID {product}")]
    DuplicateProduct { product: String },

    /// Category id not present in the catalog
    #[error("Category {category} not found")]
    CategoryNotFound { category: String },

    /// Category id already present in the catalog
    #[error("Duplicate category ID {category}")]
    DuplicateCategory { category: String },

    /// Category still referenced by at least one product
    #[error("Cannot delete category {category}: it is in use by products")]
    CategoryInUse { category: String },

    /// Product still referenced by at least one transaction
    #[error("Cannot delete product {product}: it has transactions")]
    ProductHasTransactions { product: String },

    /// Exit quantity left unmatched during a strict valuation
    #[error("Unsatisfied exit quantity {quantity} for product {product} under {method}")]
    UnsatisfiedExit {
        product: String,
        method: String,
        quantity: Decimal,
    },
}

// Conversion from io::Error to InventoryError
impl From<std::io::Error> for InventoryError {
    fn from(error: std::io::Error) -> Self {
        InventoryError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to InventoryError
impl From<csv::Error> for InventoryError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        InventoryError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl InventoryError {
    /// Create a ParseError without line information
    pub fn parse(message: impl Into<String>) -> Self {
        InventoryError::ParseError {
            line: None,
            message: message.into(),
        }
    }

    /// Attach a line number to a ParseError; other variants pass through
    pub fn at_line(self, line: u64) -> Self {
        match self {
            InventoryError::ParseError { message, .. } => InventoryError::ParseError {
                line: Some(line),
                message,
            },
            other => other,
        }
    }

    /// Create an InvalidMethod error
    pub fn invalid_method(method: &str) -> Self {
        InventoryError::InvalidMethod {
            method: method.to_string(),
        }
    }

    /// Create an InvalidWindow error
    pub fn invalid_window(start: NaiveDate, end: NaiveDate) -> Self {
        InventoryError::InvalidWindow { start, end }
    }

    /// Create an InvalidQuantity error
    pub fn invalid_quantity(tx: &str, quantity: Decimal) -> Self {
        InventoryError::InvalidQuantity {
            tx: tx.to_string(),
            quantity,
        }
    }

    /// Create an InvalidUnitCost error
    pub fn invalid_unit_cost(tx: &str, unit_cost: Decimal) -> Self {
        InventoryError::InvalidUnitCost {
            tx: tx.to_string(),
            unit_cost,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, product: &str) -> Self {
        InventoryError::ArithmeticOverflow {
            operation: operation.to_string(),
            product: product.to_string(),
        }
    }

    /// Create an InsufficientStock error
    pub fn insufficient_stock(product: &str, available: Decimal, requested: Decimal) -> Self {
        InventoryError::InsufficientStock {
            product: product.to_string(),
            available,
            requested,
        }
    }

    /// Create a DuplicateTransaction error
    pub fn duplicate_transaction(tx: &str, product: &str) -> Self {
        InventoryError::DuplicateTransaction {
            tx: tx.to_string(),
            product: product.to_string(),
        }
    }

    /// Create a ProductNotFound error
    pub fn product_not_found(product: &str) -> Self {
        InventoryError::ProductNotFound {
            product: product.to_string(),
        }
    }

    /// Create a DuplicateProduct error
    pub fn duplicate_product(product: &str) -> Self {
        InventoryError::DuplicateProduct {
            product: product.to_string(),
        }
    }

    /// Create a CategoryNotFound error
    pub fn category_not_found(category: &str) -> Self {
        InventoryError::CategoryNotFound {
            category: category.to_string(),
        }
    }

    /// Create a DuplicateCategory error
    pub fn duplicate_category(category: &str) -> Self {
        InventoryError::DuplicateCategory {
            category: category.to_string(),
        }
    }

    /// Create a CategoryInUse error
    pub fn category_in_use(category: &str) -> Self {
        InventoryError::CategoryInUse {
            category: category.to_string(),
        }
    }

    /// Create a ProductHasTransactions error
    pub fn product_has_transactions(product: &str) -> Self {
        InventoryError::ProductHasTransactions {
            product: product.to_string(),
        }
    }

    /// Create an UnsatisfiedExit error
    pub fn unsatisfied_exit(product: &str, method: &str, quantity: Decimal) -> Self {
        InventoryError::UnsatisfiedExit {
            product: product.to_string(),
            method: method.to_string(),
            quantity,
        }
    }
}
