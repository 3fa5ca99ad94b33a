//! Output sink trait and error types

use crate::catalog::Product;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize product: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receiver of extracted products
///
/// The crawler pushes each product as soon as it is extracted. A sink must
/// make an accepted product durable before returning so that a run aborted
/// later still leaves a usable partial output.
pub trait ProductSink: Send {
    /// Accepts one product
    fn emit(&mut self, product: &Product) -> OutputResult<()>;
}

/// Collects products in memory
impl ProductSink for Vec<Product> {
    fn emit(&mut self, product: &Product) -> OutputResult<()> {
        self.push(product.clone());
        Ok(())
    }
}
