//! JSON Lines product sink

use crate::catalog::Product;
use crate::output::traits::{OutputResult, ProductSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per product, one product per line
///
/// Every line is flushed as soon as it is written.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Creates (or truncates) the output file
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file path
    ///
    /// # Returns
    ///
    /// * `Ok(JsonLinesSink)` - Sink writing to the new file
    /// * `Err(OutputError)` - The file could not be created
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Wraps an arbitrary writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of products written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Consumes the sink and returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ProductSink for JsonLinesSink<W> {
    fn emit(&mut self, product: &Product) -> OutputResult<()> {
        let line = serde_json::to_string(product)?;
        tracing::debug!("Product extracted: {}", line);

        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}
