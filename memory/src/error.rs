//! Vector memory store error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("vector store backend unavailable: {0}")]
    Unavailable(String),
    #[error("character collection not found: {0}")]
    CollectionNotFound(String),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
