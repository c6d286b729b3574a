//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over the rows of either input file, the
//! product catalog or the transaction log. Delegates CSV format concerns to
//! the csv_format module.
//!
//! # Design
//!
//! `SyncReader<T>` uses csv::Reader to deserialize rows of type `T` one at a
//! time and converts each with `CsvRow::convert`. The whole file is never
//! loaded into memory.
//!
//! ```no_run
//! use inventory_valuation::io::sync_reader::TransactionReader;
//! use std::path::Path;
//!
//! let reader = TransactionReader::new(Path::new("transactions.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(tx) => println!("{:?}", tx),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as `Err` items carrying the line number

use crate::io::csv_format::{open_error, CsvProductRecord, CsvRow, CsvTransactionRecord};
use crate::types::InventoryError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

/// Streaming reader over the transaction log
pub type TransactionReader = SyncReader<CsvTransactionRecord>;

/// Streaming reader over the product catalog
pub type ProductReader = SyncReader<CsvProductRecord>;

/// Synchronous CSV reader yielding converted rows of type `T`
#[derive(Debug)]
pub struct SyncReader<T> {
    reader: csv::Reader<File>,
    line_num: u64,
    _row: PhantomData<fn() -> T>,
}

impl<T: CsvRow> SyncReader<T> {
    /// Open a CSV file for streaming iteration
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (for optional trailing columns)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` when the file does not exist, or `IoError` when it
    /// cannot be opened.
    pub fn new(path: &Path) -> Result<Self, InventoryError> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
            _row: PhantomData,
        })
    }
}

impl<T: CsvRow> Iterator for SyncReader<T> {
    type Item = Result<T::Output, InventoryError>;

    /// Read, deserialize and convert the next row
    ///
    /// Line numbers count the header as line 1.
    fn next(&mut self) -> Option<Self::Item> {
        let mut rows = self.reader.deserialize::<T>();
        let next = rows.next()?;

        self.line_num += 1;
        let line = self.line_num + 1;

        Some(match next {
            Ok(row) => row.convert().map_err(|e| e.at_line(line)),
            Err(e) => Err(InventoryError::from(e)),
        })
    }
}
