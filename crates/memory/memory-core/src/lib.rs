//! Core types shared by the vector memory store, its query strategies, and
//! the knowledge store's character-name normalization rule.

mod strategy_result;
mod types;

pub use strategy_result::{QueryCategory, VectorStrategy};
pub use types::{
    collection_name_for_character, extract_character_from_collection, normalize_character_name,
    Contradiction, MemoryRecord, MemoryRole, VectorName,
};
