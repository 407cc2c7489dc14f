pub mod document;

pub use document::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Document packing failed: {0}")]
    Packing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
