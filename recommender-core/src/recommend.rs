use std::cmp::Ordering;

use crate::matrix::UserItemMatrix;
use crate::similarity::SimilarityMatrix;
use crate::types::Recommendation;

/// A neighbor selected for scoring: its row position in both matrices, its
/// user ID and its similarity to the target user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub user_id: i64,
    pub similarity: f64,
}

/// The `n` users most similar to `user_id`, excluding the user itself.
/// Ordered by similarity descending, ties by ascending user ID.
pub fn nearest_neighbors(
    similarity: &SimilarityMatrix,
    user_id: i64,
    n: usize,
) -> Vec<Neighbor> {
    let Some(sims) = similarity.row(user_id) else {
        return Vec::new();
    };

    let mut neighbors: Vec<Neighbor> = similarity
        .users()
        .iter()
        .zip(sims)
        .enumerate()
        .filter(|&(_, (&other, _))| other != user_id)
        .map(|(row, (&other, &sim))| Neighbor {
            row,
            user_id: other,
            similarity: sim,
        })
        .collect();

    neighbors.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then(a.user_id.cmp(&b.user_id))
    });
    neighbors.truncate(n);
    neighbors
}

/// Rank the items `user_id` has not rated by the similarity-weighted mean of
/// the neighbors' ratings and return the best `k`.
///
/// Empty when the user has no ratings, when `k` is 0, or when the selected
/// neighbors' similarities sum to exactly zero.
pub fn recommend(
    matrix: &UserItemMatrix,
    similarity: &SimilarityMatrix,
    user_id: i64,
    k: usize,
    n_neighbors: usize,
) -> Vec<Recommendation> {
    if k == 0 {
        return Vec::new();
    }
    let Some(target) = matrix.user_row(user_id) else {
        tracing::debug!(user_id, "no ratings for user, nothing to recommend");
        return Vec::new();
    };

    let neighbors = nearest_neighbors(similarity, user_id, n_neighbors);
    let sim_sum: f64 = neighbors.iter().map(|n| n.similarity).sum();
    if sim_sum == 0.0 {
        tracing::debug!(user_id, neighbors = neighbors.len(), "zero similarity mass");
        return Vec::new();
    }

    let mut weighted = vec![0.0; matrix.n_items()];
    for n in &neighbors {
        for (acc, &rating) in weighted.iter_mut().zip(matrix.row(n.row)) {
            *acc += n.similarity * rating;
        }
    }

    let mut scored: Vec<Recommendation> = matrix
        .items()
        .iter()
        .zip(weighted)
        .zip(target)
        .filter(|&(_, &own)| !is_rated(own))
        .map(|((&item_id, w), _)| Recommendation {
            item_id,
            score: w / sim_sum,
        })
        .collect();

    scored.sort_by(by_score_desc);
    scored.truncate(k);

    tracing::debug!(
        user_id,
        neighbors = neighbors.len(),
        results = scored.len(),
        "recommendations computed"
    );
    scored
}

/// 0.0 is the unrated sentinel, so a genuine zero rating never counts as rated.
fn is_rated(value: f64) -> bool {
    value > 0.0
}

fn by_score_desc(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score.total_cmp(&a.score).then(a.item_id.cmp(&b.item_id))
}
