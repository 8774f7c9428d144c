//! Record sink contract and the shipped batching CSV sink.

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::{
    data::{Record, Value},
    io_utils,
};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// A destination that drains a lazy record sequence and commits it in
/// batches at its own cadence.
///
/// The sequence is single-consumer and finite unless the input is. Sink
/// implementations own their batch boundaries and transactional behavior;
/// the caller imposes no timeout on commits. An `Err` item from the sequence
/// must abort the drain and propagate.
pub trait RecordSink {
    /// Consumes the sequence to completion, returning the number of records
    /// committed.
    fn load(&mut self, records: &mut dyn Iterator<Item = Result<Record>>) -> Result<u64>;
}

/// Renders typed records to canonical CSV, flushing every `batch_size`
/// records. Nulls render as empty fields.
pub struct CsvSink {
    writer: csv::Writer<Box<dyn std::io::Write>>,
    batch_size: u64,
}

impl CsvSink {
    pub fn create(path: &Path, batch_size: usize) -> Result<Self> {
        Ok(CsvSink {
            writer: io_utils::open_csv_writer(path)?,
            batch_size: batch_size.max(1) as u64,
        })
    }
}

impl RecordSink for CsvSink {
    fn load(&mut self, records: &mut dyn Iterator<Item = Result<Record>>) -> Result<u64> {
        let mut written = 0u64;
        for record in records {
            let record = record?;
            let fields = record
                .iter()
                .map(|cell| cell.as_ref().map(Value::as_display).unwrap_or_default());
            self.writer
                .write_record(fields)
                .context("Writing record to sink")?;
            written += 1;
            if written % self.batch_size == 0 {
                self.writer.flush().context("Committing sink batch")?;
                debug!("Committed batch ending at record {written}");
            }
        }
        self.writer.flush().context("Committing final sink batch")?;
        Ok(written)
    }
}
