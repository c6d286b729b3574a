//! Asynchronous CSV reader with batch interface
//!
//! Reads converted rows from a CSV stream in fixed-size batches for the
//! asynchronous report strategy.
//!
//! # Architecture
//!
//! ```text
//! CSV stream → AsyncReader<R, T> → Batches of T::Output
//!                    ↓
//!             csv_format module
//!             (CsvRow::convert)
//! ```
//!
//! Rows that fail to parse or convert are logged with their line number and
//! left out of the batch, matching what the synchronous strategy skips.

use crate::io::csv_format::{CsvRow, CsvTransactionRecord};
use crate::types::InventoryError;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::marker::PhantomData;
use tracing::warn;

/// Batched reader over the transaction log
pub type AsyncTransactionReader<R> = AsyncReader<R, CsvTransactionRecord>;

/// Asynchronous CSV reader yielding batches of converted rows
pub struct AsyncReader<R: AsyncRead + Unpin, T> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
    _row: PhantomData<fn() -> T>,
}

impl<R, T> AsyncReader<R, T>
where
    R: AsyncRead + Unpin + Send + 'static,
    T: CsvRow,
{
    /// Wrap an async byte stream
    ///
    /// Uses the same trimming and flexible field counts as the sync reader.
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 0,
            _row: PhantomData,
        }
    }

    /// Read up to `batch_size` valid rows
    ///
    /// An empty batch means the end of the stream. Invalid rows do not count
    /// toward the batch size.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<T::Output> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<T>();

        while batch.len() < batch_size {
            let Some(next) = rows.next().await else {
                break;
            };

            self.line_num += 1;
            let line = self.line_num + 1;

            match next {
                Ok(row) => match row.convert() {
                    Ok(output) => batch.push(output),
                    Err(e) => warn!(error = %e.at_line(line), "skipping malformed record"),
                },
                Err(e) => {
                    let error = InventoryError::parse(e.to_string()).at_line(line);
                    warn!(error = %error, "skipping malformed record");
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_format::CsvProductRecord;
    use crate::types::TransactionKind;
    use futures::io::Cursor;
    use rust_decimal_macros::dec;

    const TX_HEADER: &str = "id,product,type,quantity,unit_cost,date,notes\n";

    fn reader(content: String) -> AsyncTransactionReader<Cursor<Vec<u8>>> {
        AsyncReader::new(Cursor::new(content.into_bytes()))
    }

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let mut reader = reader(format!(
            "{TX_HEADER}t1,p1,entry,10,1,2024-01-01,\nt2,p1,exit,2,,2024-01-02,\nt3,p2,entry,3,4,2024-01-03,\n"
        ));

        let batch = reader.read_batch(2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id.as_deref(), Some("t1"));
        assert_eq!(batch[1].kind, TransactionKind::Exit);

        let batch = reader.read_batch(2).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].product_id, "p2");
        assert_eq!(batch[0].unit_cost, dec!(4));

        assert!(reader.read_batch(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let mut reader = reader(TX_HEADER.to_string());

        assert!(reader.read_batch(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_invalid_records() {
        let mut reader = reader(format!(
            "{TX_HEADER}t1,p1,refund,1,1,2024-01-01,\nt2,p1,entry,1,1,not-a-date,\nt3,p1,entry,1,1,2024-01-01,\n"
        ));

        let batch = reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id.as_deref(), Some("t3"));
    }

    #[tokio::test]
    async fn test_async_reader_reads_products() {
        let content = "id,name,description,category,sku,min_stock,price,barcode\n\
                       p1,Hammer,,tools,HAM-1,2,10,\n";
        let mut reader: AsyncReader<_, CsvProductRecord> =
            AsyncReader::new(Cursor::new(content.as_bytes().to_vec()));

        let batch = reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].category_id, "tools");
        assert_eq!(batch[0].min_stock, dec!(2));
    }
}
