//! Storage crate: the relational Knowledge Store (L4) — facts, preferences,
//! static character traits, and the derived character trait relationship graph.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – `Fact`, `Preference`, `CharacterTrait`, `CharacterTraitRelationship`
//! - [`knowledge_store`] – `KnowledgeStore` (SQLite-backed)
//! - [`sqlite_pool`] – `SqlitePoolManager`

mod error;
mod knowledge_store;
mod models;
mod sqlite_pool;

pub use error::StorageError;
pub use knowledge_store::KnowledgeStore;
pub use models::{CharacterTrait, CharacterTraitRelationship, Fact, Preference, TraitRelationKind};
pub use sqlite_pool::SqlitePoolManager;
