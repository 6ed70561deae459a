//! Asynchronous CSV reader with batch interface
//!
//! Provides batched reading of operation records from a CSV script.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - the csv_format module for row conversion
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of OperationRecords
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```
//!
//! Malformed rows are logged, counted and skipped.

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::OperationRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: usize,
    malformed: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader over `reader`
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
            malformed: 0,
        }
    }

    /// Read up to `batch_size` well-formed operation records
    ///
    /// Returns an empty vector once the end of the input is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<OperationRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let row = match records.next().await {
                Some(row) => row,
                None => break,
            };
            self.line_num += 1;

            match row {
                Ok(csv_record) => match convert_csv_record(csv_record) {
                    Ok(record) => batch.push(record),
                    Err(e) => {
                        self.malformed += 1;
                        warn!(line = self.line_num, error = %e, "skipping malformed row");
                    }
                },
                Err(e) => {
                    self.malformed += 1;
                    warn!(line = self.line_num, error = %e, "CSV parse error");
                }
            }
        }

        batch
    }

    /// Number of rows skipped so far
    pub fn malformed(&self) -> usize {
        self.malformed
    }
}
