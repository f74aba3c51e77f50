//! Candidate retrieval: the recall stage of the pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::errors::EngineError;
use crate::models::{Candidate, User};
use crate::store::DataStore;

pub struct RetrievalService {
    store: Arc<dyn DataStore>,
}

impl RetrievalService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Recall-oriented candidate fetch: union of explicit interests and
    /// activity-derived keywords, over-fetched at 2x so ranking has room
    /// to re-sort, minus anything the user has already been shown.
    pub async fn retrieve_candidates(
        &self,
        user: &User,
        limit: usize,
    ) -> Result<Vec<Candidate>, EngineError> {
        let mut keywords = user.topics_of_interest.clone();
        for keyword in self.store.get_user_keywords(&user.id).await? {
            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        let fetched = self
            .store
            .get_candidates_by_keywords(&keywords, limit * 2)
            .await?;

        let shown: HashSet<String> = self
            .store
            .get_shown_candidates(&user.id)
            .await?
            .into_iter()
            .collect();

        let mut candidates: Vec<Candidate> = fetched
            .into_iter()
            .filter(|c| !shown.contains(&c.id))
            .collect();
        candidates.truncate(limit);

        debug!(
            user_id = %user.id,
            keywords = keywords.len(),
            candidates = candidates.len(),
            "candidates retrieved"
        );
        Ok(candidates)
    }
}
