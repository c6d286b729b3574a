//! Inventory Valuation Library
//! # Overview
//!
//! This library records product catalogs and stock movements and values
//! period-end inventory under FIFO, LIFO and weighted-average costing, with a
//! synchronous and an asynchronous batch report pipeline.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Transaction, Product, CostingMethod, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::valuation_engine`] - Pure valuation over a product's transactions
//!   - [`core::stock_projector`] - Current stock and low-stock checks
//!   - [`core::repository`] - Transaction log with write-time validation
//!   - [`core::catalog`] - Products and categories
//!   - [`core::inventory_service`] - Write path and queries
//! - [`io`] - CSV input and report output
//! - [`strategy`] - Sync and async report pipelines
//! - [`logging`] - Tracing subscriber setup
//!
//! # Costing Methods
//!
//! - **FIFO**: Exits consume the oldest remaining lots first
//! - **LIFO**: Exits consume the newest remaining lots first
//! - **weighted**: Remaining stock is valued at the running average cost
//!
//! # Valuation Result
//!
//! For a product and an inclusive date window:
//! - `remaining_stock`: Units left after the window's exits
//! - `total_cost`: Cost of those units
//! - `average_cost`: `total_cost / remaining_stock`, or zero with no stock
//! - `unsatisfied_quantity`: Exit quantity that found no stock to consume

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{
    current_stock, is_low_stock, valuate, Catalog, InMemoryRepository, InventoryService,
    SharedRepository, TransactionRepository, ValuationEngine,
};
pub use io::write_valuation_csv;
pub use types::{
    Category, CostingMethod, DateWindow, InventoryError, NewProduct, NewTransaction, Product,
    ProductId, ProductValuation, Transaction, TransactionId, TransactionKind, ValuationResult,
};
