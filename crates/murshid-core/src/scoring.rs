//! Weighted scoring engine and quota selection.
//!
//! Combines semantic similarity, supervision match, and recency into one
//! final score per candidate. Three disjoint regimes, selected by data
//! availability (precedence matters):
//!
//! - **Research**: external author id + fetched papers. Semantic 0.50,
//!   supervision 0.30, recency 0.20; recency comes from the newest
//!   keyword-matching paper, or at half weight from the supervisor's
//!   general `last_updated` when no paper matches.
//! - **Interest/supervision**: no papers but supervision evidence.
//!   Semantic 0.50, supervision 0.50.
//! - **Pure interest**: semantic 0.80.
//!
//! Scoring is a pure function of its inputs: re-running it over the same
//! enriched candidates yields identical scores.

use crate::config::RecommenderConfig;
use crate::recency::score_recency_at;
use crate::types::Candidate;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Expand idea keywords for textual paper matching.
///
/// Every keyword is kept whole (lowercased); multi-word phrases also
/// contribute their head word when it is substantial (≥ 5 chars), so
/// "anomaly detection" matches papers that only say "anomaly" while short
/// modifiers like the "deep" of "deep learning" are not added on their own.
pub fn expand_keywords(keywords: &[String]) -> BTreeSet<String> {
    let mut expanded = BTreeSet::new();
    for keyword in keywords {
        let lowered = keyword.trim().to_lowercase();
        if lowered.is_empty() {
            continue;
        }
        if let Some((head, _)) = lowered.split_once(char::is_whitespace) {
            if head.len() >= 5 {
                expanded.insert(head.to_string());
            }
        }
        expanded.insert(lowered);
    }
    expanded
}

/// Keywords (from the expanded set) found in a paper's title or abstract.
fn matching_keywords<'a>(
    title: &str,
    abstract_text: Option<&str>,
    expanded: &'a BTreeSet<String>,
) -> Vec<&'a str> {
    let title = title.to_lowercase();
    let abstract_text = abstract_text.map(str::to_lowercase).unwrap_or_default();
    expanded
        .iter()
        .filter(|k| title.contains(k.as_str()) || abstract_text.contains(k.as_str()))
        .map(String::as_str)
        .collect()
}

/// Apply the weighted scoring engine to an enriched candidate list.
///
/// Sets `recency_score`, `final_score`, `matched_keywords`, and
/// `top_matched_papers` on every candidate, then drops those at or below
/// the score threshold. `today` is passed explicitly so scoring stays
/// deterministic under test.
pub fn score_candidates(
    candidates: Vec<Candidate>,
    idea_keywords: &[String],
    config: &RecommenderConfig,
    today: NaiveDate,
) -> Vec<Candidate> {
    let expanded = expand_keywords(idea_keywords);
    let weights = &config.weights;

    let mut scored = Vec::with_capacity(candidates.len());
    for mut candidate in candidates {
        // Upstream data can be faulty; clamp every component independently.
        let semantic = candidate.semantic_similarity.clamp(0.0, 1.0);
        let supervision = candidate.supervision_match_score.clamp(0.0, 1.0);
        candidate.semantic_similarity = semantic;
        candidate.supervision_match_score = supervision;

        let has_author_id = candidate.record.external_author_id().is_some();
        let has_papers = !candidate.record.recent_papers.is_empty();

        let final_score = if has_papers && has_author_id {
            // Research regime: look for papers that textually touch the idea
            let mut matched: BTreeSet<String> = BTreeSet::new();
            let mut matching_titles: Vec<String> = Vec::new();
            let mut latest_matching_year: Option<i32> = None;

            for paper in &candidate.record.recent_papers {
                let hits =
                    matching_keywords(&paper.title, paper.abstract_text.as_deref(), &expanded);
                if hits.is_empty() {
                    continue;
                }
                matched.extend(hits.into_iter().map(String::from));
                matching_titles.push(paper.title.clone());
                if paper.year > 1900 {
                    latest_matching_year =
                        Some(latest_matching_year.map_or(paper.year, |y: i32| y.max(paper.year)));
                }
            }

            let recency = match latest_matching_year {
                Some(year) => score_recency_at(Some(&format!("{year}-01-01")), today),
                None => {
                    // Active in general but not provably on-topic: half credit
                    let general =
                        score_recency_at(candidate.record.last_updated.as_deref(), today);
                    round2(general * config.general_recency_factor)
                }
            };
            candidate.recency_score = recency.clamp(0.0, 1.0);
            candidate.matched_keywords = matched.into_iter().collect();
            matching_titles.truncate(3);
            candidate.top_matched_papers = matching_titles;

            weights.semantic * semantic
                + weights.supervision * supervision
                + weights.recency * candidate.recency_score
        } else if !has_papers && supervision > 0.0 {
            // Interest/supervision regime
            weights.interest_semantic * semantic + weights.interest_supervision * supervision
        } else {
            // Pure topical interest
            weights.pure_interest * semantic
        };

        candidate.final_score = round2(final_score.clamp(0.0, 1.0));

        if candidate.final_score > config.score_threshold {
            scored.push(candidate);
        } else {
            debug!(
                supervisor = %candidate.record.name,
                score = candidate.final_score,
                "candidate below threshold, dropped"
            );
        }
    }
    scored
}

/// Bucketed top-k selection: top `same_major_quota` same-major candidates
/// plus top `cross_major_quota` cross-major candidates, each bucket sorted
/// by final score descending. Guarantees topical depth while preserving
/// cross-disciplinary diversity regardless of how raw scores distribute.
///
/// Shortlist indices are (re)assigned here and stay stable through
/// re-ranking.
pub fn select_quota(scored: Vec<Candidate>, config: &RecommenderConfig) -> Vec<Candidate> {
    let (mut same, mut different): (Vec<Candidate>, Vec<Candidate>) =
        scored.into_iter().partition(|c| c.is_same_major);

    sort_by_score_desc(&mut same);
    sort_by_score_desc(&mut different);

    same.truncate(config.same_major_quota);
    different.truncate(config.cross_major_quota);

    let mut shortlist = same;
    shortlist.append(&mut different);
    for (index, candidate) in shortlist.iter_mut().enumerate() {
        candidate.index = index;
    }
    shortlist
}

/// Sort candidates by `final_score` descending (stable on ties).
pub fn sort_by_score_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SupervisorRecord;
    use murshid_scholar::Paper;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    fn candidate(
        name: &str,
        semantic: f32,
        supervision: f32,
        author_id: Option<&str>,
        papers: Vec<Paper>,
    ) -> Candidate {
        let mut c = Candidate::new(
            SupervisorRecord {
                id: name.to_lowercase().replace(' ', "-"),
                name: name.into(),
                department: "Computer Science".into(),
                author_id: author_id.map(String::from),
                orcid_id: None,
                recent_papers: papers,
                last_updated: Some("2025-01-01".into()),
            },
            semantic,
        );
        c.supervision_match_score = supervision;
        c
    }

    fn keywords() -> Vec<String> {
        vec!["Anomaly Detection".into(), "Deep Learning".into()]
    }

    #[test]
    fn test_expand_keywords() {
        let expanded = expand_keywords(&keywords());
        assert!(expanded.contains("anomaly detection"));
        assert!(expanded.contains("anomaly"));
        assert!(expanded.contains("deep learning"));
        // "deep" is too short to stand alone
        assert!(!expanded.contains("deep"));
    }

    #[test]
    fn test_research_regime_with_matching_paper() {
        let paper = Paper::new("Anomaly detection in traffic flows", 2025, 10, None, None);
        let c = candidate("Dr. A", 0.8, 0.6, Some("AUTH1"), vec![paper]);
        let scored = score_candidates(vec![c], &keywords(), &RecommenderConfig::default(), today());

        assert_eq!(scored.len(), 1);
        let c = &scored[0];
        // 2025 paper is inside the grace window → recency 1.0
        assert_eq!(c.recency_score, 1.0);
        // 0.5*0.8 + 0.3*0.6 + 0.2*1.0 = 0.78
        assert!((c.final_score - 0.78).abs() < 1e-6);
        assert_eq!(c.top_matched_papers.len(), 1);
        assert!(c.matched_keywords.iter().any(|k| k == "anomaly"));
    }

    #[test]
    fn test_research_regime_halves_general_recency_without_match() {
        let paper = Paper::new("Quantum error correction", 2025, 3, None, None);
        let c = candidate("Dr. B", 0.8, 0.6, Some("AUTH1"), vec![paper]);
        let scored = score_candidates(vec![c], &keywords(), &RecommenderConfig::default(), today());

        let c = &scored[0];
        // last_updated 2025-01-01 → general recency 1.0, halved to 0.5
        assert!((c.recency_score - 0.5).abs() < 1e-6);
        // 0.5*0.8 + 0.3*0.6 + 0.2*0.5 = 0.68
        assert!((c.final_score - 0.68).abs() < 1e-6);
        assert!(c.top_matched_papers.is_empty());
    }

    #[test]
    fn test_papers_without_author_id_fall_through_to_pure_interest() {
        let paper = Paper::new("Anomaly detection survey", 2025, 3, None, None);
        let c = candidate("Dr. C", 0.8, 0.0, None, vec![paper]);
        let scored = score_candidates(vec![c], &keywords(), &RecommenderConfig::default(), today());
        // 0.8 * 0.8 = 0.64
        assert!((scored[0].final_score - 0.64).abs() < 1e-6);
    }

    #[test]
    fn test_interest_supervision_regime() {
        let c = candidate("Dr. D", 0.6, 0.8, Some("AUTH1"), vec![]);
        let scored = score_candidates(vec![c], &keywords(), &RecommenderConfig::default(), today());
        // 0.5*0.6 + 0.5*0.8 = 0.70
        assert!((scored[0].final_score - 0.70).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_drops_weak_candidates() {
        let c = candidate("Dr. Weak", 0.1, 0.0, None, vec![]);
        let scored = score_candidates(vec![c], &keywords(), &RecommenderConfig::default(), today());
        assert!(scored.is_empty());
    }

    #[test]
    fn test_faulty_inputs_are_clamped() {
        let c = candidate("Dr. Faulty", 3.5, -2.0, None, vec![]);
        let scored = score_candidates(vec![c], &keywords(), &RecommenderConfig::default(), today());
        let c = &scored[0];
        assert!(c.final_score >= 0.0 && c.final_score <= 1.0);
        // semantic clamped to 1.0 → pure interest 0.8
        assert!((c.final_score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let paper = Paper::new("Deep learning for traffic analysis", 2024, 5, None, None);
        let make = || {
            vec![
                candidate("Dr. A", 0.8, 0.6, Some("AUTH1"), vec![paper.clone()]),
                candidate("Dr. B", 0.6, 0.8, None, vec![]),
                candidate("Dr. C", 0.5, 0.0, None, vec![]),
            ]
        };
        let config = RecommenderConfig::default();
        let first = score_candidates(make(), &keywords(), &config, today());
        let second = score_candidates(make(), &keywords(), &config, today());
        let scores = |v: &[Candidate]| v.iter().map(|c| c.final_score).collect::<Vec<_>>();
        assert_eq!(scores(&first), scores(&second));
    }

    #[test]
    fn test_quota_selection_three_plus_two() {
        let mut all = Vec::new();
        for i in 0..10 {
            let mut c = candidate(&format!("Same {i}"), 0.5, 0.0, None, vec![]);
            c.is_same_major = true;
            c.final_score = 0.5 + i as f32 * 0.01;
            all.push(c);
        }
        for i in 0..10 {
            let mut c = candidate(&format!("Diff {i}"), 0.5, 0.0, None, vec![]);
            c.is_same_major = false;
            c.final_score = 0.4 + i as f32 * 0.01;
            all.push(c);
        }

        let shortlist = select_quota(all, &RecommenderConfig::default());
        assert_eq!(shortlist.len(), 5);
        assert_eq!(shortlist.iter().filter(|c| c.is_same_major).count(), 3);
        assert_eq!(shortlist.iter().filter(|c| !c.is_same_major).count(), 2);
        // Each bucket keeps its own top scorers
        assert_eq!(shortlist[0].record.name, "Same 9");
        assert_eq!(shortlist[3].record.name, "Diff 9");
        // Indices are stable and sequential
        let indices: Vec<usize> = shortlist.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_quota_with_sparse_buckets() {
        let mut same = candidate("Only Same", 0.9, 0.0, None, vec![]);
        same.is_same_major = true;
        same.final_score = 0.72;
        let shortlist = select_quota(vec![same], &RecommenderConfig::default());
        assert_eq!(shortlist.len(), 1);
        assert_eq!(shortlist[0].index, 0);
    }
}
