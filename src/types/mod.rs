//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Stock movements and identifiers
//! - `product`: Catalog types (products and categories)
//! - `valuation`: Costing methods, date windows and valuation results
//! - `error`: Error types for the inventory engine

pub mod error;
pub mod product;
pub mod transaction;
pub mod valuation;

pub use error::InventoryError;
pub use product::{Category, CategoryId, NewProduct, Product};
pub use transaction::{NewTransaction, ProductId, Transaction, TransactionId, TransactionKind};
pub use valuation::{CostingMethod, DateWindow, ProductValuation, ValuationResult};
