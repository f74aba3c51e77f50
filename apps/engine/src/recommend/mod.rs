//! The three-stage recommendation pipeline — retrieval, ranking, top-K
//! selection — plus the feedback write path that keeps the CF cache
//! honest.

pub mod collaborative;
pub mod ranking;
pub mod retrieval;

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::models::{Feedback, ScoredCandidate, User, UserContext};
use crate::store::DataStore;
use collaborative::{CfCache, CollaborativeFilteringService};
use ranking::RankingService;
use retrieval::RetrievalService;

/// The top recommendation must clear this score before proactive
/// outreach is worth the interruption.
const PROACTIVE_SCORE_FLOOR: f64 = 0.5;

/// How many candidates to over-retrieve per requested recommendation.
const RETRIEVAL_MULTIPLIER: usize = 5;
/// Fallback pool size per requested recommendation when retrieval
/// comes back empty.
const FALLBACK_MULTIPLIER: usize = 3;

pub struct RecommendationEngine {
    store: Arc<dyn DataStore>,
    retrieval: RetrievalService,
    ranking: RankingService,
    cf_cache: Arc<CfCache>,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn DataStore>, config: EngineConfig) -> Self {
        let cf_cache = Arc::new(CfCache::new());
        let cf_service =
            CollaborativeFilteringService::with_cache(Arc::clone(&store), Arc::clone(&cf_cache));
        Self {
            retrieval: RetrievalService::new(Arc::clone(&store)),
            ranking: RankingService::new(Arc::clone(&store), cf_service),
            store,
            cf_cache,
            config,
        }
    }

    pub fn ranking(&self) -> &RankingService {
        &self.ranking
    }

    /// Personalized recommendations: load the profile (or synthesize a
    /// default — a missing user is never an error), over-retrieve,
    /// rank, return the top `limit`.
    pub async fn get_recommendations(
        &self,
        user_id: &str,
        limit: usize,
        context: Option<&UserContext>,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        let user = match self.store.get_user(user_id).await? {
            Some(user) => user,
            None => {
                debug!(user_id, "unknown user, substituting default profile");
                User::anonymous(user_id)
            }
        };

        let mut candidates = self
            .retrieval
            .retrieve_candidates(&user, limit * RETRIEVAL_MULTIPLIER)
            .await?;

        if candidates.is_empty() {
            // Nothing matched the user's keywords: fall back to the
            // head of the whole pool rather than returning nothing.
            candidates = self.store.get_all_candidates().await?;
            candidates.truncate(limit * FALLBACK_MULTIPLIER);
        }

        let mut scored = self.ranking.rank_candidates(candidates, &user, context).await?;
        scored.truncate(limit);
        Ok(scored)
    }

    /// Recommendations at the configured default limit.
    pub async fn default_recommendations(
        &self,
        user_id: &str,
        context: Option<&UserContext>,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        self.get_recommendations(user_id, self.config.recommendation_limit, context)
            .await
    }

    /// Single best suggestion for proactive outreach, or `None` when
    /// nothing clears the quality floor.
    pub async fn get_proactive_suggestion(
        &self,
        user_id: &str,
        context: Option<&UserContext>,
    ) -> Result<Option<ScoredCandidate>, EngineError> {
        let recommendations = self.get_recommendations(user_id, 1, context).await?;
        Ok(recommendations
            .into_iter()
            .next()
            .filter(|top| top.score >= PROACTIVE_SCORE_FLOOR))
    }

    /// Persists feedback (the store applies the engagement delta) and
    /// invalidates the CF cache so the next evaluation sees it.
    pub async fn record_feedback(&self, feedback: Feedback) -> Result<Feedback, EngineError> {
        let saved = self.store.record_feedback(feedback).await?;
        self.cf_cache.clear().await;
        info!(
            user_id = %saved.user_id,
            candidate_id = %saved.candidate_id,
            action = ?saved.action,
            "feedback recorded"
        );
        Ok(saved)
    }
}
