//! Concurrent implementations of core components
//!
//! This module provides thread-safe counterparts of the single-owner
//! repository, used by the asynchronous report strategy.
//!
//! - **SharedRepository**: Transaction log on `DashMap` with per-product
//!   atomic append and change subscription
//! - **BatchProcessor**: Product-partitioned parallel append and valuation
//!
//! # Thread Safety
//!
//! - Appends for different products proceed in parallel
//! - Appends for the same product are serialized by the product's map entry
//! - No global locks

pub mod batch_processor;
pub mod repository;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use repository::SharedRepository;
