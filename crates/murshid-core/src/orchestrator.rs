//! The recommendation pipeline.
//!
//! [`Recommender`] wires the collaborators together and drives one request
//! through the stages: embed, vector search, hydrate, enrich, score, quota
//! select, re-rank. Every collaborator sits behind a trait object so the
//! whole pipeline runs against in-memory fakes in tests.
//!
//! Failure policy: only the hydration read from the primary store aborts a
//! request. Embedding and search failures yield an empty recommendation,
//! and per-candidate enrichment failures degrade that one candidate.

use crate::config::RecommenderConfig;
use crate::department::same_field;
use crate::error::Result;
use crate::rerank::rerank_and_explain;
use crate::scoring::{score_candidates, select_quota};
use crate::store::SharedStore;
use crate::supervision::supervision_match;
use crate::types::{Candidate, Idea, Recommendation, RecommendationRequest, SupervisorRecord};
use chrono::Utc;
use futures::future::join_all;
use murshid_index::{VectorHit, VectorIndex};
use murshid_llm::{EmbeddingProvider, Reasoner};
use murshid_scholar::{Paper, PaperLookup};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Drives the supervisor recommendation pipeline.
pub struct Recommender {
    store: SharedStore,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    papers: Arc<dyn PaperLookup>,
    reasoner: Arc<dyn Reasoner>,
    config: RecommenderConfig,
}

impl Recommender {
    /// Assemble a recommender from its collaborators.
    pub fn new(
        store: SharedStore,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        papers: Arc<dyn PaperLookup>,
        reasoner: Arc<dyn Reasoner>,
        config: RecommenderConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
            papers,
            reasoner,
            config,
        }
    }

    /// Produce a ranked supervisor recommendation for one idea.
    ///
    /// Returns at most `top_k` candidates, best first. An unembeddable idea
    /// or an empty search result produces an empty recommendation, not an
    /// error; only a failed hydration read from the primary store does.
    #[instrument(skip_all, fields(top_k = request.top_k))]
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation> {
        if request.top_k == 0 || request.idea_text.trim().is_empty() {
            return Ok(Recommendation {
                candidates: Vec::new(),
                reranked: false,
            });
        }

        let embedding = match self.embedder.embed(&request.idea_text).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "idea embedding failed");
                return Ok(Recommendation {
                    candidates: Vec::new(),
                    reranked: false,
                });
            }
        };
        // The provider signals unembeddable input with an all-zero vector;
        // searching on it would return arbitrary neighbors.
        if embedding.iter().all(|v| *v == 0.0) {
            debug!("idea produced a zero embedding, nothing to search");
            return Ok(Recommendation {
                candidates: Vec::new(),
                reranked: false,
            });
        }
        let idea = Idea {
            text: request.idea_text.clone(),
            keywords: request.keywords.clone(),
            embedding,
        };

        let fetch_limit = request.top_k.saturating_mul(self.config.overfetch_factor).max(1);
        let hits = match self
            .index
            .search(&self.config.collection, &idea.embedding, fetch_limit)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "vector search failed");
                return Ok(Recommendation {
                    candidates: Vec::new(),
                    reranked: false,
                });
            }
        };
        if hits.is_empty() {
            return Ok(Recommendation {
                candidates: Vec::new(),
                reranked: false,
            });
        }

        let candidates = self.hydrate(&hits).await?;
        debug!(
            hits = hits.len(),
            hydrated = candidates.len(),
            "candidates hydrated"
        );

        let candidates = self
            .enrich(candidates, &idea.embedding, &request.student_major)
            .await;

        let today = Utc::now().date_naive();
        let scored = score_candidates(candidates, &idea.keywords, &self.config, today);
        let shortlist = select_quota(scored, &self.config);
        if shortlist.is_empty() {
            return Ok(Recommendation {
                candidates: Vec::new(),
                reranked: false,
            });
        }

        let outcome = rerank_and_explain(self.reasoner.as_ref(), shortlist, &idea.text).await;
        let reranked = !outcome.is_fallback();
        let mut candidates = outcome.into_candidates();
        candidates.truncate(request.top_k);

        info!(
            returned = candidates.len(),
            reranked, "recommendation complete"
        );
        Ok(Recommendation {
            candidates,
            reranked,
        })
    }

    /// Join vector hits with their primary-store documents.
    ///
    /// Hits whose record id cannot be resolved, or with no matching
    /// document, are dropped. Index order (score descending) is preserved.
    async fn hydrate(&self, hits: &[VectorHit]) -> Result<Vec<Candidate>> {
        let mut ids: Vec<String> = Vec::with_capacity(hits.len());
        for hit in hits {
            match hit.record_id() {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => debug!(point = %hit.id, "hit carries no resolvable record id"),
            }
        }

        let records = self.store.fetch_by_ids(&ids).await?;
        let by_id: std::collections::HashMap<&str, &SupervisorRecord> =
            records.iter().map(|r| (r.id.as_str(), r)).collect();

        let mut seen: Vec<&str> = Vec::with_capacity(hits.len());
        let mut candidates = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(id) = hit.record_id() else { continue };
            let Some(record) = by_id.get(id.as_str()) else {
                continue;
            };
            if seen.contains(&record.id.as_str()) {
                continue;
            }
            seen.push(record.id.as_str());
            candidates.push(Candidate::new((*record).clone(), hit.score));
        }
        Ok(candidates)
    }

    /// Enrich all candidates concurrently.
    ///
    /// Per candidate, the paper refresh and the supervision match run in
    /// parallel; candidates run scatter-gather. A failure in either leg
    /// degrades only that candidate.
    async fn enrich(
        &self,
        candidates: Vec<Candidate>,
        idea_embedding: &[f32],
        student_major: &str,
    ) -> Vec<Candidate> {
        let tasks = candidates.into_iter().map(|mut candidate| async move {
            let papers_fut = self.refresh_papers(&candidate.record);
            let supervision_fut = supervision_match(
                self.store.as_ref(),
                &candidate.record.id,
                idea_embedding,
                self.config.embedding_dim,
            );
            let (papers, (supervision_score, best_match)) =
                tokio::join!(papers_fut, supervision_fut);

            if let Some((papers, last_updated)) = papers {
                candidate.record.recent_papers = papers;
                candidate.record.last_updated = Some(last_updated);
            }
            candidate.supervision_match_score = supervision_score;
            candidate.best_matched_project = best_match;
            candidate.is_same_major = same_field(&candidate.record.department, student_major);
            candidate
        });
        join_all(tasks).await
    }

    /// Fetch fresh papers for a candidate and write them back to the store.
    ///
    /// `None` means nothing changed: no external author id, a lookup
    /// failure, or an empty result. Write-back failures are logged and
    /// ignored; the refreshed papers still feed this request.
    async fn refresh_papers(&self, record: &SupervisorRecord) -> Option<(Vec<Paper>, String)> {
        let author_id = record.external_author_id()?;
        let papers = match self
            .papers
            .papers_by_author(author_id, self.config.max_papers)
            .await
        {
            Ok(papers) => papers,
            Err(e) => {
                warn!(supervisor = %record.id, error = %e, "paper lookup failed, using cached papers");
                return None;
            }
        };
        if papers.is_empty() {
            return None;
        }

        let last_updated = match papers.iter().map(|p| p.year).max().filter(|y| *y > 0) {
            Some(year) => format!("{year}-01-01"),
            None => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        };
        if let Err(e) = self
            .store
            .update_recent_papers(&record.id, &papers, &last_updated)
            .await
        {
            warn!(supervisor = %record.id, error = %e, "paper write-back failed");
        }
        Some((papers, last_updated))
    }
}
