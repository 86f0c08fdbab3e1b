//! Query classification result types, consumed by the Vector Memory Store (L3)
//! and produced by the Query Classifier (L2, `memory-strategies` crate).

use crate::types::VectorName;

/// One of the five query categories a raw query is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCategory {
    Factual,
    Conversational,
    Emotional,
    Temporal,
    General,
}

/// Which named vectors to search, with what weights, and whether to fuse them.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStrategy {
    pub vector_names: Vec<VectorName>,
    pub weights: Vec<f32>,
    pub fuse: bool,
}

impl VectorStrategy {
    pub fn single(name: VectorName) -> Self {
        Self {
            vector_names: vec![name],
            weights: vec![1.0],
            fuse: false,
        }
    }

    pub fn fused(pairs: &[(VectorName, f32)]) -> Self {
        Self {
            vector_names: pairs.iter().map(|(n, _)| *n).collect(),
            weights: pairs.iter().map(|(_, w)| *w).collect(),
            fuse: true,
        }
    }

    pub fn scroll() -> Self {
        Self {
            vector_names: Vec::new(),
            weights: Vec::new(),
            fuse: false,
        }
    }
}
