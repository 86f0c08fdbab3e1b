//! Vector Memory Store (L3).
//!
//! Defines the storage-agnostic contract for a character's memory collection:
//! one collection per character (named via
//! [`memory_core::collection_name_for_character`]), three named vectors per
//! record (`content`, `emotion`, `semantic`), server-side `user_id`
//! filtering, and reciprocal-rank fusion across named vectors when a query
//! strategy asks for more than one.
//!
//! Concrete backends (in-process, Qdrant-shaped, etc.) implement
//! [`VectorMemoryStore`]; see the `memory-inmemory` crate for the reference
//! implementation used in tests and for small deployments.

mod error;
mod fusion;
mod store;

pub use error::{MemoryError, Result};
pub use fusion::reciprocal_rank_fusion;
pub use store::{QueryVectors, VectorMemoryStore};
