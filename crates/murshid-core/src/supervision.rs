//! Supervision-match scoring.
//!
//! Measures how well a new idea aligns with the projects a supervisor has
//! historically supervised. The score is the **mean** cosine similarity
//! over all of their projects, not the max; a supervisor with a
//! consistently relevant portfolio beats one lucky match. The single best
//! match is still returned, but only as evidence for the justification.

use crate::similarity::cosine_similarity;
use crate::store::SupervisorStore;
use crate::types::BestMatchedProject;
use tracing::debug;

/// Compute the supervision-match score for one candidate.
///
/// Returns `(0.0, None)` when the supervisor has no resolvable name, no
/// historical projects, or no project with a valid `embedding_dim`-length
/// embedding. Store failures also degrade to `(0.0, None)`; a broken
/// lookup must never abort the candidate batch.
pub async fn supervision_match(
    store: &dyn SupervisorStore,
    supervisor_id: &str,
    idea_embedding: &[f32],
    embedding_dim: usize,
) -> (f32, Option<BestMatchedProject>) {
    let name = match store.supervisor_name(supervisor_id).await {
        Ok(Some(name)) if !name.trim().is_empty() => name,
        Ok(_) => return (0.0, None),
        Err(e) => {
            debug!(supervisor_id, error = %e, "name lookup failed, skipping supervision match");
            return (0.0, None);
        }
    };

    let projects = match store.projects_supervised_by(&name).await {
        Ok(projects) => projects,
        Err(e) => {
            debug!(supervisor_id, error = %e, "project lookup failed, skipping supervision match");
            return (0.0, None);
        }
    };

    let comparable: Vec<_> = projects
        .into_iter()
        .filter(|p| p.embedding.len() == embedding_dim)
        .collect();
    if comparable.is_empty() {
        return (0.0, None);
    }

    let mut sum = 0.0f32;
    let mut best_index = 0usize;
    let mut best_similarity = f32::NEG_INFINITY;
    let similarities: Vec<f32> = comparable
        .iter()
        .map(|p| cosine_similarity(idea_embedding, &p.embedding))
        .collect();
    for (i, similarity) in similarities.iter().enumerate() {
        sum += similarity;
        if *similarity > best_similarity {
            best_similarity = *similarity;
            best_index = i;
        }
    }

    let mean = sum / similarities.len() as f32;
    let score = round2(mean.clamp(0.0, 1.0));

    let best = &comparable[best_index];
    let best_match = BestMatchedProject {
        title: best.title.clone(),
        keywords: best.keywords.clone(),
        match_score: round2(best_similarity.clamp(0.0, 1.0)),
    };

    debug!(
        supervisor_id,
        projects = comparable.len(),
        score,
        best = %best_match.title,
        "supervision match computed"
    );
    (score, Some(best_match))
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{SupervisedProject, SupervisorRecord};

    fn record(id: &str, name: &str) -> SupervisorRecord {
        SupervisorRecord {
            id: id.into(),
            name: name.into(),
            department: "CS".into(),
            author_id: None,
            orcid_id: None,
            recent_papers: Vec::new(),
            last_updated: None,
        }
    }

    fn project(title: &str, supervisor: &str, embedding: Vec<f32>) -> SupervisedProject {
        SupervisedProject {
            title: title.into(),
            keywords: vec!["k".into()],
            supervisors: vec![supervisor.into()],
            embedding,
        }
    }

    #[tokio::test]
    async fn test_unknown_supervisor_returns_zero() {
        let store = MemoryStore::new();
        let (score, best) = supervision_match(&store, "ghost", &[1.0, 0.0], 2).await;
        assert_eq!(score, 0.0);
        assert!(best.is_none());
    }

    #[tokio::test]
    async fn test_no_projects_returns_zero() {
        let store = MemoryStore::new();
        store.insert_supervisor(record("s1", "Dr. A")).await;
        let (score, best) = supervision_match(&store, "s1", &[1.0, 0.0], 2).await;
        assert_eq!(score, 0.0);
        assert!(best.is_none());
    }

    #[tokio::test]
    async fn test_invalid_embeddings_are_skipped() {
        let store = MemoryStore::new();
        store.insert_supervisor(record("s1", "Dr. A")).await;
        // Wrong dimensionality: must not count
        store.insert_project(project("bad", "Dr. A", vec![1.0])).await;
        let (score, best) = supervision_match(&store, "s1", &[1.0, 0.0], 2).await;
        assert_eq!(score, 0.0);
        assert!(best.is_none());
    }

    #[tokio::test]
    async fn test_mean_over_all_projects() {
        let store = MemoryStore::new();
        store.insert_supervisor(record("s1", "Dr. A")).await;
        // similarity 1.0 and 0.0 → mean 0.5
        store
            .insert_project(project("aligned", "Dr. A", vec![1.0, 0.0]))
            .await;
        store
            .insert_project(project("orthogonal", "Dr. A", vec![0.0, 1.0]))
            .await;

        let (score, best) = supervision_match(&store, "s1", &[1.0, 0.0], 2).await;
        assert!((score - 0.5).abs() < 1e-6);

        let best = best.unwrap();
        assert_eq!(best.title, "aligned");
        assert!((best.match_score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_other_supervisors_projects_ignored() {
        let store = MemoryStore::new();
        store.insert_supervisor(record("s1", "Dr. A")).await;
        store
            .insert_project(project("theirs", "Dr. B", vec![1.0, 0.0]))
            .await;
        let (score, _) = supervision_match(&store, "s1", &[1.0, 0.0], 2).await;
        assert_eq!(score, 0.0);
    }
}
