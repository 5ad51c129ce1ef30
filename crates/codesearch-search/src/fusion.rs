//! Reciprocal-rank fusion (§4.7): combine a keyword-ranked list and a
//! semantic-ranked list into one ranked list without needing the two
//! retrieval engines' raw scores to be comparable.

use std::collections::HashMap;

/// Smoothing constant and per-arm weights for [`fuse`]. Mirrors
/// `codesearch_config::SearchConfig`'s defaults (`k = 60`, `w_k = 0.4`,
/// `w_s = 0.6`) so callers can build one from the loaded config.
#[derive(Debug, Clone, Copy)]
pub struct RrfConfig {
    pub k: f64,
    pub keyword_weight: f64,
    pub vector_weight: f64,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self {
            k: 60.0,
            keyword_weight: 0.4,
            vector_weight: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusedResult {
    pub doc_id: String,
    pub score: f64,
    pub keyword_rank: Option<usize>,
    pub vector_rank: Option<usize>,
}

/// Fuses two rank-ordered (best first) `doc_id` lists. Ranks are assigned
/// 1-based from list position; a `doc_id` absent from a list contributes
/// zero to that arm's term (equivalent to treating its rank as infinity).
///
/// Results are ordered by `score` descending, ties broken by keyword rank
/// ascending (documents missing a keyword rank sort after those with one),
/// then by `doc_id` ascending. Truncated to `limit`, and any result scoring
/// below `min_score` is dropped.
pub fn fuse(
    keyword_ranked: &[String],
    vector_ranked: &[String],
    config: &RrfConfig,
    limit: usize,
    min_score: f64,
) -> Vec<FusedResult> {
    let keyword_ranks: HashMap<&str, usize> = keyword_ranked
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i + 1))
        .collect();
    let vector_ranks: HashMap<&str, usize> = vector_ranked
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i + 1))
        .collect();

    let mut doc_ids: Vec<&str> = keyword_ranks.keys().copied().collect();
    for id in vector_ranks.keys() {
        if !keyword_ranks.contains_key(id) {
            doc_ids.push(id);
        }
    }

    let mut results: Vec<FusedResult> = doc_ids
        .into_iter()
        .map(|doc_id| {
            let keyword_rank = keyword_ranks.get(doc_id).copied();
            let vector_rank = vector_ranks.get(doc_id).copied();
            let keyword_term = keyword_rank
                .map(|r| config.keyword_weight / (config.k + r as f64))
                .unwrap_or(0.0);
            let vector_term = vector_rank
                .map(|r| config.vector_weight / (config.k + r as f64))
                .unwrap_or(0.0);
            FusedResult {
                doc_id: doc_id.to_string(),
                score: keyword_term + vector_term,
                keyword_rank,
                vector_rank,
            }
        })
        .filter(|r| r.score >= min_score)
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.keyword_rank
                    .unwrap_or(usize::MAX)
                    .cmp(&b.keyword_rank.unwrap_or(usize::MAX))
            })
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });

    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(results: &[FusedResult]) -> Vec<&str> {
        results.iter().map(|r| r.doc_id.as_str()).collect()
    }

    #[test]
    fn document_in_both_lists_outranks_one_appearing_in_only_one() {
        let keyword = vec!["a".to_string(), "b".to_string()];
        let vector = vec!["b".to_string(), "c".to_string()];
        let results = fuse(&keyword, &vector, &RrfConfig::default(), 10, 0.0);
        assert_eq!(ids(&results)[0], "b");
    }

    #[test]
    fn absent_from_a_list_contributes_zero_not_an_error() {
        let keyword = vec!["a".to_string()];
        let vector: Vec<String> = vec![];
        let results = fuse(&keyword, &vector, &RrfConfig::default(), 10, 0.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].vector_rank, None);
    }

    #[test]
    fn ties_break_by_keyword_rank_then_doc_id() {
        // Neither document appears in the vector list, so both scores are
        // driven purely by keyword rank; equal keyword rank is impossible
        // here by construction, so this exercises the doc_id tie-break only
        // when scores coincide through symmetric placement.
        let keyword = vec!["z".to_string(), "a".to_string()];
        let vector: Vec<String> = vec![];
        let results = fuse(&keyword, &vector, &RrfConfig::default(), 10, 0.0);
        assert_eq!(ids(&results), vec!["z", "a"]);
    }

    #[test]
    fn truncates_to_limit() {
        let keyword: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let vector: Vec<String> = vec![];
        let results = fuse(&keyword, &vector, &RrfConfig::default(), 3, 0.0);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn drops_results_below_min_score() {
        let keyword: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let vector: Vec<String> = vec![];
        let config = RrfConfig::default();
        let top_score = config.keyword_weight / (config.k + 1.0);
        let results = fuse(&keyword, &vector, &config, 10, top_score - 1e-9);
        assert_eq!(results.len(), 1, "only the top-ranked document clears the threshold");
    }

    #[test]
    fn empty_inputs_produce_empty_output() {
        let results = fuse(&[], &[], &RrfConfig::default(), 10, 0.0);
        assert!(results.is_empty());
    }
}
