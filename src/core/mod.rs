//! Core business logic module
//!
//! This module contains the inventory components:
//! - `stock_projector` - Net stock from a product's history
//! - `valuation_engine` - FIFO, LIFO and weighted-average valuation
//! - `traits` - The `TransactionRepository` seam
//! - `repository` - Single-owner in-memory transaction log
//! - `catalog` - Products and categories with referential guards
//! - `inventory_service` - Write path and read-side queries
//! - `async` - Thread-safe repository and batch processing

pub mod r#async;
pub mod catalog;
pub mod inventory_service;
pub mod repository;
pub mod stock_projector;
pub mod traits;
pub mod valuation_engine;

pub use catalog::Catalog;
pub use inventory_service::InventoryService;
pub use r#async::{BatchProcessor, SharedRepository};
pub use repository::InMemoryRepository;
pub use stock_projector::{current_stock, is_low_stock};
pub use traits::TransactionRepository;
pub use valuation_engine::{valuate, ValuationEngine};
