/// Cosine-similarity ranking
///
/// Scores candidate vectors against a query vector and keeps the best `top_k`.
/// Pure functions, no I/O.

/// Default number of templates handed to the generation step
pub const DEFAULT_TOP_K: i64 = 5;

/// A candidate with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub score: f64,
}

/// Cosine similarity of `a` and `b`
///
/// Only the overlapping prefix `min(a.len(), b.len())` is compared, so vectors of
/// different lengths are truncated rather than rejected. If either side has zero
/// magnitude over that prefix the result is `0.0`, which keeps placeholder vectors
/// at the bottom of a ranking instead of producing `NaN`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut mag_a = 0.0_f64;
    let mut mag_b = 0.0_f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a.sqrt() * mag_b.sqrt())
}

/// Rank candidates by descending similarity and keep the first `top_k`
///
/// Equal scores keep their input order. A non-positive `top_k` yields an empty
/// list. The result length is `min(top_k, candidates)`.
pub fn rank_top_k<'a, T>(
    query: &[f32],
    candidates: impl IntoIterator<Item = (T, &'a [f32])>,
    top_k: i64,
) -> Vec<Ranked<T>> {
    if top_k <= 0 {
        return Vec::new();
    }

    let mut scored: Vec<Ranked<T>> = candidates
        .into_iter()
        .map(|(item, vector)| Ranked {
            item,
            score: cosine_similarity(query, vector),
        })
        .collect();

    // `sort_by` is stable, ties stay in encounter order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(usize::try_from(top_k).unwrap_or(usize::MAX));
    scored
}
