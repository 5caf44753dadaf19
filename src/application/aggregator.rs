//! CSV aggregation
//!
//! The schema is computed from every record before anything is written:
//! the five core columns in fixed order, then the union of all other keys
//! in ascending order. The output file is only created once all records
//! are in hand, so a run that fails earlier leaves no file behind.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tracing::debug;

use crate::domain::EnrichedRecord;
use crate::domain::constants::columns;
use crate::error::{ScrapeError, ScrapeResult};

/// Ordered column list of the output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    columns: Vec<String>,
}

impl OutputSchema {
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let extra: BTreeSet<&str> = records
            .iter()
            .flat_map(EnrichedRecord::column_names)
            .filter(|name| !columns::CORE.contains(name))
            .collect();

        let columns = columns::CORE
            .iter()
            .copied()
            .chain(extra)
            .map(str::to_string)
            .collect();

        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Writes records as delimited text
#[derive(Debug, Clone, Copy)]
pub struct CsvAggregator {
    delimiter: u8,
}

impl Default for CsvAggregator {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvAggregator {
    pub const fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Write header and rows to any writer
    pub fn write_to<W: Write>(&self, writer: W, records: &[EnrichedRecord]) -> Result<OutputSchema, csv::Error> {
        let schema = OutputSchema::from_records(records);
        let mut csv_writer = WriterBuilder::new().delimiter(self.delimiter).from_writer(writer);

        csv_writer.write_record(schema.columns())?;
        for record in records {
            csv_writer.write_record(schema.columns().iter().map(|column| record.cell(column)))?;
        }
        csv_writer.flush()?;

        Ok(schema)
    }

    /// Create (or truncate) `path` and write every record to it
    pub fn write_file(&self, path: &Path, records: &[EnrichedRecord]) -> ScrapeResult<OutputSchema> {
        let output_error = |source| ScrapeError::Output {
            path: path.to_path_buf(),
            source,
        };

        let file = std::fs::File::create(path)?;
        let schema = self.write_to(file, records).map_err(output_error)?;
        debug!("Wrote {} rows with {} columns to {}", records.len(), schema.len(), path.display());
        Ok(schema)
    }
}
