//! Reciprocal-rank fusion across named-vector search results.
//!
//! Per spec §4.3: "one search per named vector with the same limit,
//! reciprocal-rank-fused with the given weights, deduplicated by record id,
//! truncated to limit."

use std::collections::HashMap;
use uuid::Uuid;

/// Standard RRF smoothing constant.
const RRF_K: f32 = 60.0;

/// Fuses multiple rank-ordered (best-first) id lists, each carrying a
/// strategy weight, into a single combined score per id. Callers sort the
/// returned map descending by score, breaking ties by newer timestamp, then
/// truncate to the requested limit.
pub fn reciprocal_rank_fusion(ranked_lists: &[(f32, Vec<Uuid>)]) -> HashMap<Uuid, f32> {
    let mut scores: HashMap<Uuid, f32> = HashMap::new();
    for (weight, ids) in ranked_lists {
        for (rank, id) in ids.iter().enumerate() {
            let contribution = weight / (RRF_K + rank as f32 + 1.0);
            *scores.entry(*id).or_insert(0.0) += contribution;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_id_present_in_both_lists_outranks_one_present_in_a_single_list() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        // `a` ranks first in both lists; `b` only in the first; `c` only in the second.
        let lists = vec![(0.5, vec![a, b]), (0.5, vec![a, c])];
        let scores = reciprocal_rank_fusion(&lists);

        assert!(scores[&a] > scores[&b]);
        assert!(scores[&a] > scores[&c]);
    }
}
