//! I/O module
//!
//! Handles CSV parsing and report output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, report serialization)
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface
//! - `catalog_loader` - Builds a `Catalog` from the products file

pub mod async_reader;
pub mod catalog_loader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::{AsyncReader, AsyncTransactionReader};
pub use catalog_loader::load_catalog;
pub use csv_format::{
    convert_product_record, convert_transaction_record, write_valuation_csv, CsvProductRecord,
    CsvRow, CsvTransactionRecord,
};
pub use sync_reader::{ProductReader, SyncReader, TransactionReader};
