use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes serializable rows as CSV with a header derived from the row type.
pub fn write_trace<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), TraceError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_trace_to_path<P: AsRef<Path>, T: Serialize>(
    path: P,
    rows: &[T],
) -> Result<(), TraceError> {
    let file = File::create(path)?;
    write_trace(BufWriter::new(file), rows)
}
