//! Primary-store seam.
//!
//! The engine never talks to a concrete database; it sees this trait. The
//! production implementation wraps the document store the HTTP layer owns,
//! [`MemoryStore`] backs tests and local experiments.

use crate::error::{Error, Result};
use crate::types::{SupervisedProject, SupervisorRecord};
use async_trait::async_trait;
use murshid_scholar::Paper;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Document-store operations the pipeline needs.
#[async_trait]
pub trait SupervisorStore: Send + Sync {
    /// Bulk-fetch supervisor records by id. Ids with no matching document
    /// are silently absent from the result.
    ///
    /// This backs the hydration stage; errors here fail the request.
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<SupervisorRecord>>;

    /// Look up a supervisor's display name.
    async fn supervisor_name(&self, id: &str) -> Result<Option<String>>;

    /// All graduation projects historically supervised by `name`.
    async fn projects_supervised_by(&self, name: &str) -> Result<Vec<SupervisedProject>>;

    /// Partial-field write-back of refreshed papers for one supervisor.
    /// Touches only `recent_papers` and `last_updated` on that document.
    async fn update_recent_papers(
        &self,
        id: &str,
        papers: &[Paper],
        last_updated: &str,
    ) -> Result<()>;
}

/// Shared store handle.
pub type SharedStore = Arc<dyn SupervisorStore>;

/// In-memory [`SupervisorStore`] for tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    supervisors: RwLock<HashMap<String, SupervisorRecord>>,
    projects: RwLock<Vec<SupervisedProject>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a supervisor record.
    pub async fn insert_supervisor(&self, record: SupervisorRecord) {
        self.supervisors
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    /// Add a historical graduation project.
    pub async fn insert_project(&self, project: SupervisedProject) {
        self.projects.write().await.push(project);
    }

    /// Fetch a single record (test inspection).
    pub async fn get(&self, id: &str) -> Option<SupervisorRecord> {
        self.supervisors.read().await.get(id).cloned()
    }
}

#[async_trait]
impl SupervisorStore for MemoryStore {
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<SupervisorRecord>> {
        let supervisors = self.supervisors.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| supervisors.get(id).cloned())
            .collect())
    }

    async fn supervisor_name(&self, id: &str) -> Result<Option<String>> {
        Ok(self
            .supervisors
            .read()
            .await
            .get(id)
            .map(|r| r.name.clone()))
    }

    async fn projects_supervised_by(&self, name: &str) -> Result<Vec<SupervisedProject>> {
        Ok(self
            .projects
            .read()
            .await
            .iter()
            .filter(|p| p.supervisors.iter().any(|s| s == name))
            .cloned()
            .collect())
    }

    async fn update_recent_papers(
        &self,
        id: &str,
        papers: &[Paper],
        last_updated: &str,
    ) -> Result<()> {
        let mut supervisors = self.supervisors.write().await;
        let record = supervisors
            .get_mut(id)
            .ok_or_else(|| Error::Store(format!("no supervisor with id {id}")))?;
        record.recent_papers = papers.to_vec();
        record.last_updated = Some(last_updated.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> SupervisorRecord {
        SupervisorRecord {
            id: id.into(),
            name: name.into(),
            department: "Computer Science".into(),
            author_id: None,
            orcid_id: None,
            recent_papers: Vec::new(),
            last_updated: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_by_ids_skips_unknown() {
        let store = MemoryStore::new();
        store.insert_supervisor(record("a", "Dr. A")).await;
        let records = store
            .fetch_by_ids(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Dr. A");
    }

    #[tokio::test]
    async fn test_projects_supervised_by_filters_on_name() {
        let store = MemoryStore::new();
        store
            .insert_project(SupervisedProject {
                title: "P1".into(),
                keywords: vec![],
                supervisors: vec!["Dr. A".into()],
                embedding: vec![1.0, 0.0],
            })
            .await;
        store
            .insert_project(SupervisedProject {
                title: "P2".into(),
                keywords: vec![],
                supervisors: vec!["Dr. B".into()],
                embedding: vec![0.0, 1.0],
            })
            .await;

        let projects = store.projects_supervised_by("Dr. A").await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "P1");
    }

    #[tokio::test]
    async fn test_update_recent_papers_is_partial() {
        let store = MemoryStore::new();
        store.insert_supervisor(record("a", "Dr. A")).await;

        let papers = vec![Paper::new("T", 2025, 4, None, None)];
        store
            .update_recent_papers("a", &papers, "2025-01-01")
            .await
            .unwrap();

        let updated = store.get("a").await.unwrap();
        assert_eq!(updated.recent_papers.len(), 1);
        assert_eq!(updated.last_updated.as_deref(), Some("2025-01-01"));
        // Untouched fields survive
        assert_eq!(updated.name, "Dr. A");
    }

    #[tokio::test]
    async fn test_update_unknown_supervisor_errors() {
        let store = MemoryStore::new();
        let result = store.update_recent_papers("ghost", &[], "2025-01-01").await;
        assert!(result.is_err());
    }
}
