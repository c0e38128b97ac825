//! Cosine similarity and ranked retrieval over a feature matrix.

use crate::features::FeatureMatrix;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Score assigned to excluded rows; always below the acceptance floor
pub const EXCLUDED_SCORE: f64 = -1.0;

/// Cosine similarity between two vectors.
///
/// Returns 0.0 if the vectors have different lengths, are empty, or either
/// has zero magnitude.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[must_use]
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// A retrieved row and its similarity to the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub index: usize,
    pub score: f64,
}

/// Score of every row against `target`, excluded rows forced to
/// [`EXCLUDED_SCORE`]. Rows are scored in parallel.
#[must_use]
pub fn score_rows(matrix: &FeatureMatrix, target: &[f64], exclude: &HashSet<usize>) -> Vec<f64> {
    let rows: Vec<&[f64]> = matrix.rows().collect();
    rows.par_iter()
        .enumerate()
        .map(|(index, row)| {
            if exclude.contains(&index) {
                EXCLUDED_SCORE
            } else {
                cosine_similarity(target, row)
            }
        })
        .collect()
}

/// Highest-scoring rows, best first.
///
/// Ties are broken by ascending index. Only strictly positive scores are
/// kept, so the result can be shorter than `top_n`.
#[must_use]
pub fn top_n(scores: &[f64], top_n: usize) -> Vec<Scored> {
    let mut ranked: Vec<Scored> = scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score > 0.0)
        .map(|(index, &score)| Scored { index, score })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    ranked.truncate(top_n);
    ranked
}
