//! Re-ranking and explanation stage.
//!
//! Sends the scored shortlist to the reasoning service for a qualitative
//! reorder plus natural-language justifications. The service is
//! best-effort: any malformed, incomplete, or failed response keeps the
//! locally computed order and synthesizes a justification instead. The
//! request can never fail here.

use crate::types::{Candidate, RerankOutcome};
use murshid_llm::Reasoner;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Candidate summary sent to the reasoning service.
///
/// Scores ship as fixed-precision strings so the model sees stable,
/// comparable numbers rather than float noise.
#[derive(Debug, Serialize)]
struct RerankEntry {
    id: usize,
    name: String,
    department: String,
    initial_score: String,
    semantic_similarity: String,
    supervision_match_score: String,
    matching_keywords: Vec<String>,
    is_same_major: bool,
    top_matched_papers: Vec<String>,
    best_matched_project_title: String,
    best_matched_project_score: f32,
}

/// One re-ranked item from the reasoning service.
#[derive(Debug, Deserialize)]
struct RerankedItem {
    id: usize,
    #[serde(default)]
    reranked_score: Option<f32>,
    /// The service has been observed emitting both casings
    #[serde(default, alias = "Justification")]
    justification: Option<String>,
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn entry_for(candidate: &Candidate) -> RerankEntry {
    let (best_title, best_score) = candidate
        .best_matched_project
        .as_ref()
        .map(|b| (b.title.clone(), b.match_score))
        .unwrap_or_default();

    RerankEntry {
        id: candidate.index,
        name: candidate.record.name.clone(),
        department: candidate.record.department.clone(),
        initial_score: format!("{:.4}", candidate.final_score),
        semantic_similarity: format!("{:.4}", candidate.semantic_similarity),
        supervision_match_score: format!("{:.2}", candidate.supervision_match_score),
        matching_keywords: candidate.matched_keywords.clone(),
        is_same_major: candidate.is_same_major,
        top_matched_papers: candidate
            .top_matched_papers
            .iter()
            .take(3)
            .map(|t| truncate_chars(t, 100))
            .collect(),
        best_matched_project_title: best_title,
        best_matched_project_score: best_score,
    }
}

fn build_prompt(entries: &[RerankEntry], idea_text: &str) -> String {
    let data = serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are an expert in academic supervision and semantic analysis of graduation projects. Your task is to RE-RANK the candidate supervisors below and produce a detailed justification for each recommendation.

INPUT:

* Student's project idea: {idea_text}
* Candidate supervisors (initial quantitative ranking):
{data}

CRITICAL RULES:

1. The output must be a JSON array of objects containing EVERY input supervisor exactly once.
2. Reorder the supervisors from most to least suitable for this idea.
3. Every object must contain two mandatory new fields:
   * "reranked_score": a value between 0.0 and 1.0 reflecting suitability after qualitative analysis (must be consistent with the new order).
   * "justification": a concise, professional rationale (100-150 words) that explicitly connects the student's idea, the supervisor's department, and their research interests. Where available it must cite:
     - Supervision evidence: note when "supervision_match_score" is high (above 0.60) and the supervisor has guided similar projects (see "best_matched_project_title").
     - Research evidence: use the paper titles in "top_matched_papers" as proof of the supervisor's specialization and its fit to the idea.

REQUIRED OUTPUT FORMAT (JSON array):

[
    {{
        "id": 0,
        "name": "<name>",
        "reranked_score": 0.95,
        "justification": "<100-150 word rationale>"
    }}
]

Output ONLY the JSON array. No extra text before or after."#
    )
}

/// Parse the service response defensively.
///
/// Strict JSON first; if the model wrapped the array in prose, fall back
/// to the outermost `[...]` slice.
fn parse_response(text: &str) -> Option<Vec<RerankedItem>> {
    let text = text.trim();
    if let Ok(items) = serde_json::from_str::<Vec<RerankedItem>>(text) {
        return Some(items);
    }
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn synthetic_justification(candidate: &Candidate) -> String {
    format!(
        "Recommended on the initial quantitative ranking (score {:.2}); the re-ranking service was unavailable, so the locally computed order was retained.",
        candidate.final_score
    )
}

fn fallback(mut shortlist: Vec<Candidate>, reason: String) -> RerankOutcome {
    warn!(%reason, "re-ranking unavailable, keeping local order");
    crate::scoring::sort_by_score_desc(&mut shortlist);
    for candidate in &mut shortlist {
        if candidate.justification.is_none() {
            candidate.justification = Some(synthetic_justification(candidate));
        }
    }
    RerankOutcome::Fallback {
        candidates: shortlist,
        reason,
    }
}

/// Re-rank the shortlist and attach justifications.
///
/// The returned candidate set is always exactly the input set; only order,
/// `final_score`, and `justification` may change.
pub async fn rerank_and_explain(
    reasoner: &dyn Reasoner,
    shortlist: Vec<Candidate>,
    idea_text: &str,
) -> RerankOutcome {
    if shortlist.is_empty() {
        return RerankOutcome::Fallback {
            candidates: shortlist,
            reason: "empty shortlist".to_string(),
        };
    }

    let entries: Vec<RerankEntry> = shortlist.iter().map(entry_for).collect();
    let prompt = build_prompt(&entries, idea_text);

    let response = match reasoner.generate_json(&prompt).await {
        Ok(text) => text,
        Err(e) => return fallback(shortlist, format!("reasoning service error: {e}")),
    };

    let Some(items) = parse_response(&response) else {
        return fallback(shortlist, "malformed re-ranking response".to_string());
    };
    if items.is_empty() {
        return fallback(shortlist, "empty re-ranking response".to_string());
    }

    // The echoed index set must equal the input set; anything else means
    // the model dropped or invented candidates and the output is unusable.
    let mut expected: Vec<usize> = shortlist.iter().map(|c| c.index).collect();
    let mut echoed: Vec<usize> = items.iter().map(|i| i.id).collect();
    expected.sort_unstable();
    echoed.sort_unstable();
    echoed.dedup();
    if expected != echoed {
        return fallback(
            shortlist,
            "re-ranking response does not echo the input candidate set".to_string(),
        );
    }

    let mut reranked = shortlist;
    for candidate in &mut reranked {
        // Set equality above guarantees a match exists
        if let Some(item) = items.iter().find(|i| i.id == candidate.index) {
            if let Some(score) = item.reranked_score {
                candidate.final_score = score.clamp(0.0, 1.0);
            }
            candidate.justification = Some(
                item.justification
                    .clone()
                    .filter(|j| !j.trim().is_empty())
                    .unwrap_or_else(|| synthetic_justification(candidate)),
            );
        }
    }
    crate::scoring::sort_by_score_desc(&mut reranked);

    info!(candidates = reranked.len(), "re-ranking applied");
    debug!(top = ?reranked.first().map(|c| &c.record.name), "new leading candidate");
    RerankOutcome::Reranked(reranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SupervisorRecord;
    use async_trait::async_trait;

    struct CannedReasoner(murshid_llm::Result<String>);

    #[async_trait]
    impl Reasoner for CannedReasoner {
        async fn generate_json(&self, _prompt: &str) -> murshid_llm::Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(murshid_llm::Error::Network("unreachable".into())),
            }
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    fn candidate(index: usize, name: &str, score: f32) -> Candidate {
        let mut c = Candidate::new(
            SupervisorRecord {
                id: format!("s{index}"),
                name: name.into(),
                department: "Computer Science".into(),
                author_id: None,
                orcid_id: None,
                recent_papers: Vec::new(),
                last_updated: None,
            },
            score,
        );
        c.index = index;
        c.final_score = score;
        c
    }

    #[tokio::test]
    async fn test_successful_rerank_reorders_and_explains() {
        let response = r#"[
            {"id": 0, "reranked_score": 0.40, "justification": "Weaker fit overall for this idea."},
            {"id": 1, "reranked_score": 0.95, "Justification": "Strong alignment with the idea."}
        ]"#;
        let reasoner = CannedReasoner(Ok(response.to_string()));
        let shortlist = vec![candidate(0, "Dr. A", 0.8), candidate(1, "Dr. B", 0.6)];

        let outcome = rerank_and_explain(&reasoner, shortlist, "idea").await;
        assert!(!outcome.is_fallback());
        let candidates = outcome.into_candidates();
        assert_eq!(candidates[0].record.name, "Dr. B");
        assert_eq!(candidates[0].final_score, 0.95);
        assert!(candidates[1].justification.as_ref().unwrap().contains("Weaker"));
    }

    #[tokio::test]
    async fn test_service_error_falls_back_to_local_order() {
        let reasoner = CannedReasoner(Err(murshid_llm::Error::Network("x".into())));
        let shortlist = vec![candidate(0, "Dr. A", 0.6), candidate(1, "Dr. B", 0.9)];

        let outcome = rerank_and_explain(&reasoner, shortlist, "idea").await;
        assert!(outcome.is_fallback());
        let candidates = outcome.candidates();
        // Same set, sorted by the original local scores
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].record.name, "Dr. B");
        assert!(candidates.iter().all(|c| c.justification.is_some()));
    }

    #[tokio::test]
    async fn test_wrong_index_set_is_discarded() {
        // Echoes an id that was never sent
        let response = r#"[
            {"id": 0, "reranked_score": 0.9, "justification": "ok"},
            {"id": 7, "reranked_score": 0.8, "justification": "invented"}
        ]"#;
        let reasoner = CannedReasoner(Ok(response.to_string()));
        let shortlist = vec![candidate(0, "Dr. A", 0.8), candidate(1, "Dr. B", 0.6)];

        let outcome = rerank_and_explain(&reasoner, shortlist, "idea").await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.candidates()[0].final_score, 0.8);
    }

    #[tokio::test]
    async fn test_prose_wrapped_json_is_recovered() {
        let response = r#"Here is the ranking:
[{"id": 0, "reranked_score": 0.7, "justification": "fits well"}]
Hope this helps."#;
        let reasoner = CannedReasoner(Ok(response.to_string()));
        let shortlist = vec![candidate(0, "Dr. A", 0.5)];

        let outcome = rerank_and_explain(&reasoner, shortlist, "idea").await;
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.candidates()[0].final_score, 0.7);
    }

    #[tokio::test]
    async fn test_garbage_response_falls_back() {
        let reasoner = CannedReasoner(Ok("I cannot rank these supervisors.".to_string()));
        let shortlist = vec![candidate(0, "Dr. A", 0.5)];
        let outcome = rerank_and_explain(&reasoner, shortlist, "idea").await;
        assert!(outcome.is_fallback());
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_clamped() {
        let response = r#"[{"id": 0, "reranked_score": 1.8, "justification": "great"}]"#;
        let reasoner = CannedReasoner(Ok(response.to_string()));
        let outcome =
            rerank_and_explain(&reasoner, vec![candidate(0, "Dr. A", 0.5)], "idea").await;
        assert_eq!(outcome.candidates()[0].final_score, 1.0);
    }

    #[test]
    fn test_prompt_contains_idea_and_entries() {
        let entries = vec![entry_for(&candidate(0, "Dr. A", 0.8))];
        let prompt = build_prompt(&entries, "smart traffic monitoring");
        assert!(prompt.contains("smart traffic monitoring"));
        assert!(prompt.contains("\"name\": \"Dr. A\""));
        assert!(prompt.contains("Output ONLY the JSON array"));
    }
}
