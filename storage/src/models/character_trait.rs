//! Static character trait rows, as loaded/authored for a character (CDL-derived).
//!
//! Trait kinds observed: `personality`, `value`, `interest`, `communication`,
//! `behavior`. Kept as a plain string rather than an enum since character
//! content authoring is out of scope (spec §1) and new kinds may appear.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CharacterTrait {
    pub character: String,
    pub trait_type: String,
    pub trait_name: String,
    pub trait_value: String,
    pub intensity: f64,
    pub importance: i64,
    pub context: Option<String>,
}

impl CharacterTrait {
    pub fn key(&self) -> String {
        format!("{}.{}", self.trait_type, self.trait_name)
    }
}
