//! User-based collaborative filtering with a popularity blend for cold
//! start.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::EngineError;
use crate::store::DataStore;

/// Scale applied to the global-popularity signal added on top of the
/// similar-user score.
const POPULARITY_BLEND: f64 = 0.3;

/// Memoized CF scores keyed by user id. No expiry: the feedback write
/// path invalidates through a shared handle when new feedback lands.
///
/// Reads and writes are serialized by the inner lock; callers that need
/// a strict ordering between invalidation and recomputation must
/// serialize themselves, or accept transient staleness.
#[derive(Default)]
pub struct CfCache {
    inner: RwLock<HashMap<String, HashMap<String, f64>>>,
}

impl CfCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get(&self, user_id: &str) -> Option<HashMap<String, f64>> {
        self.inner.read().await.get(user_id).cloned()
    }

    async fn insert(&self, user_id: &str, scores: HashMap<String, f64>) {
        self.inner.write().await.insert(user_id.to_string(), scores);
    }

    /// Drops the cached scores for one user.
    pub async fn invalidate(&self, user_id: &str) {
        self.inner.write().await.remove(user_id);
    }

    /// Drops every cached entry. New feedback shifts the scores of all
    /// users similar to the author, so the feedback path clears
    /// wholesale rather than chasing the affected set.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

pub struct CollaborativeFilteringService {
    store: Arc<dyn DataStore>,
    cache: Arc<CfCache>,
}

impl CollaborativeFilteringService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self::with_cache(store, Arc::new(CfCache::new()))
    }

    /// Shares an externally owned cache so the feedback path can
    /// invalidate it.
    pub fn with_cache(store: Arc<dyn DataStore>, cache: Arc<CfCache>) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> Arc<CfCache> {
        Arc::clone(&self.cache)
    }

    /// Candidate scores derived from similar users' positive feedback,
    /// normalized by the maximum observed value, with the popularity
    /// signal blended on top. Memoized per user until invalidated.
    pub async fn get_cf_scores(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, f64>, EngineError> {
        if let Some(cached) = self.cache.get(user_id).await {
            debug!(user_id, "cf cache hit");
            return Ok(cached);
        }

        let mut cf_scores: HashMap<String, f64> = HashMap::new();

        let engaged = self
            .store
            .get_candidates_engaged_by_similar_users(user_id, 50)
            .await?;
        if !engaged.is_empty() {
            let max_score = engaged.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);
            for (candidate_id, score) in engaged {
                let normalized = if max_score > 0.0 { score / max_score } else { 0.0 };
                cf_scores.insert(candidate_id, normalized);
            }
        }

        let popular = self.store.get_popular_candidates(20).await?;
        if !popular.is_empty() {
            let max_count = popular.iter().map(|(_, c)| *c).max().unwrap_or(0);
            for (candidate_id, count) in popular {
                let pop_score = if max_count > 0 {
                    (count as f64 / max_count as f64) * POPULARITY_BLEND
                } else {
                    0.0
                };
                *cf_scores.entry(candidate_id).or_insert(0.0) += pop_score;
            }
        }

        debug!(user_id, candidates = cf_scores.len(), "cf scores computed");
        self.cache.insert(user_id, cf_scores.clone()).await;
        Ok(cf_scores)
    }
}
