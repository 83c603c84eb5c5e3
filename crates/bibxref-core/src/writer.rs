//! Serialized append-only output sink.
//!
//! Groups are written as uninterrupted row blocks in completion order, which
//! is not stable across runs; only intra-block order and row integrity are
//! guaranteed.

use std::fs::File;
use std::path::Path;

use csv::{Terminator, WriterBuilder};
use tokio::sync::Mutex;

use crate::error::Result;

pub struct ResultWriter {
    inner: Mutex<csv::Writer<File>>,
}

impl ResultWriter {
    /// Opens (truncating) the output file and writes the augmented header:
    /// `Index` prepended, `DOI` and `Abstract` appended.
    pub fn create(path: &Path, delimiter: u8, input_header: &[String]) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(Terminator::CRLF)
            .flexible(true)
            .from_writer(file);

        let mut header = Vec::with_capacity(input_header.len() + 3);
        header.push("Index".to_string());
        header.extend(input_header.iter().cloned());
        header.push("DOI".to_string());
        header.push("Abstract".to_string());
        write_row(&mut writer, &header)?;
        writer.flush()?;

        Ok(Self {
            inner: Mutex::new(writer),
        })
    }

    /// Appends one group's rows as a single block and flushes.
    pub async fn append_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        let mut writer = self.inner.lock().await;
        for row in rows {
            write_row(&mut writer, row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

// Every row carries one trailing empty field, so it ends with the delimiter
// before the line break.
fn write_row(writer: &mut csv::Writer<File>, fields: &[String]) -> Result<()> {
    writer.write_record(fields.iter().map(String::as_str).chain(std::iter::once("")))?;
    Ok(())
}
