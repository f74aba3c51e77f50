//! Candidate scoring and ranking.
//!
//! The additive six-component formula is deliberately explicit — no
//! learned model — and lives behind [`ScoringStrategy`] so a trained
//! ranker can replace it without touching retrieval or trigger logic.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::collaborative::CollaborativeFilteringService;
use crate::errors::EngineError;
use crate::models::{
    Candidate, ContentCategory, ScoredCandidate, Signal, User, UserActivity, UserContext,
};
use crate::store::DataStore;

// ────────────────────────────────────────────────────────────────────────────
// Scoring weights and signal thresholds
// ────────────────────────────────────────────────────────────────────────────

const INTEREST_WEIGHT: f64 = 0.35;
const ACTIVITY_WEIGHT: f64 = 0.25;
const CF_WEIGHT: f64 = 0.15;
const ENGAGEMENT_WEIGHT: f64 = 0.10;
const RECENCY_WEIGHT: f64 = 0.10;
const TIMING_WEIGHT: f64 = 0.05;

/// Interest matches saturate here.
const INTEREST_SATURATION: f64 = 3.0;
/// Activity matches saturate here.
const ACTIVITY_SATURATION: f64 = 5.0;
/// Engagement score saturates here.
const ENGAGEMENT_SATURATION: f64 = 5.0;
/// Content older than this many days contributes no recency.
const RECENCY_HORIZON_DAYS: f64 = 30.0;
/// How many recent activities inform the relevance component.
const ACTIVITY_LOOKBACK: usize = 10;

/// The CF signal is only worth surfacing above this contribution.
const CF_SIGNAL_FLOOR: f64 = 0.05;
/// Content younger than this many days is called out as trending.
const TRENDING_MAX_DAYS: i64 = 3;
/// Receptivity above this earns a timing signal.
const TIMING_SIGNAL_FLOOR: f64 = 0.7;
/// Score multiplier for candidates repeating an already-seen category.
const DIVERSITY_PENALTY: f64 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Strategy trait
// ────────────────────────────────────────────────────────────────────────────

/// Pluggable candidate scorer. Implement to swap the ranking formula
/// without touching retrieval or trigger logic.
pub trait ScoringStrategy: Send + Sync {
    /// Returns the candidate's score in [0, 1] plus the signals
    /// explaining it. Recency is computed relative to `now`.
    fn score(
        &self,
        candidate: &Candidate,
        user: &User,
        activities: &[UserActivity],
        context: Option<&UserContext>,
        cf_scores: &HashMap<String, f64>,
        now: DateTime<Utc>,
    ) -> (f64, Vec<Signal>);
}

/// Default additive heuristic: interest 35%, activity 25%, CF 15%,
/// engagement 10%, recency 10%, timing 5%. A component whose
/// precondition fails is simply absent — no redistribution — and the
/// sum is capped at 1.0.
pub struct WeightedScorer;

impl ScoringStrategy for WeightedScorer {
    fn score(
        &self,
        candidate: &Candidate,
        user: &User,
        activities: &[UserActivity],
        context: Option<&UserContext>,
        cf_scores: &HashMap<String, f64>,
        now: DateTime<Utc>,
    ) -> (f64, Vec<Signal>) {
        let mut signals = Vec::new();
        let mut total = 0.0;

        // 1. Interest match
        let interest_matches = candidate.matches_interests(&user.topics_of_interest);
        if interest_matches > 0 {
            let contribution =
                (interest_matches as f64 / INTEREST_SATURATION).min(1.0) * INTEREST_WEIGHT;
            total += contribution;
            signals.push(Signal::new(
                "match",
                format!("Matches {interest_matches} of your interests"),
                contribution,
            ));
        }

        // 2. Activity relevance over the most recent events
        let mut activity_keywords: HashSet<String> = HashSet::new();
        for activity in activities.iter().take(ACTIVITY_LOOKBACK) {
            activity_keywords.extend(activity.keywords.iter().cloned());
            if let Some(query) = &activity.query {
                activity_keywords
                    .extend(query.to_lowercase().split_whitespace().map(str::to_string));
            }
        }
        let candidate_keywords: HashSet<&str> =
            candidate.keywords.iter().map(String::as_str).collect();
        let activity_matches = candidate_keywords
            .iter()
            .filter(|&&keyword| activity_keywords.contains(keyword))
            .count();
        if activity_matches > 0 {
            let contribution =
                (activity_matches as f64 / ACTIVITY_SATURATION).min(1.0) * ACTIVITY_WEIGHT;
            total += contribution;
            let (kind, description) = match activities.first().map(|a| a.activity_type.as_str()) {
                Some("article_read") => ("reading_history", "Related to articles you've been reading"),
                Some("search") => ("search_history", "Related to your recent searches"),
                _ => ("activity_history", "Related to your recent activity"),
            };
            signals.push(Signal::new(kind, description, contribution));
        }

        // 3. Collaborative filtering
        if let Some(cf_score) = cf_scores.get(&candidate.id) {
            let contribution = cf_score * CF_WEIGHT;
            total += contribution;
            if contribution > CF_SIGNAL_FLOOR {
                signals.push(Signal::new(
                    "similar_users",
                    "Liked by users with similar interests",
                    contribution,
                ));
            }
        }

        // 4. Engagement
        let engagement =
            (candidate.engagement_score / ENGAGEMENT_SATURATION).min(1.0) * ENGAGEMENT_WEIGHT;
        total += engagement;
        if engagement > 0.0 {
            signals.push(Signal::new(
                "engagement",
                "Well received by other readers",
                engagement,
            ));
        }

        // 5. Recency — skipped entirely when created_at is missing or
        // malformed
        if let Ok(created) = DateTime::parse_from_rfc3339(&candidate.created_at) {
            let days_old = (now - created.with_timezone(&Utc)).num_days();
            let contribution =
                (1.0 - days_old as f64 / RECENCY_HORIZON_DAYS).max(0.0) * RECENCY_WEIGHT;
            total += contribution;
            if days_old < TRENDING_MAX_DAYS {
                signals.push(Signal::new(
                    "trending",
                    "Fresh content from the last few days",
                    contribution,
                ));
            }
        }

        // 6. Timing
        if let Some(ctx) = context {
            let contribution = ctx.receptivity_score * TIMING_WEIGHT;
            total += contribution;
            if ctx.receptivity_score > TIMING_SIGNAL_FLOOR {
                signals.push(Signal::new(
                    "timing",
                    "Optimal time based on your patterns",
                    contribution,
                ));
            }
        }

        (total.min(1.0), signals)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking service
// ────────────────────────────────────────────────────────────────────────────

pub struct RankingService {
    store: Arc<dyn DataStore>,
    cf_service: CollaborativeFilteringService,
    strategy: Arc<dyn ScoringStrategy>,
}

impl RankingService {
    pub fn new(store: Arc<dyn DataStore>, cf_service: CollaborativeFilteringService) -> Self {
        Self {
            store,
            cf_service,
            strategy: Arc::new(WeightedScorer),
        }
    }

    /// Swaps the scoring formula.
    pub fn with_strategy(mut self, strategy: Arc<dyn ScoringStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Scores and orders candidates for a user, then applies the
    /// diversity pass.
    pub async fn rank_candidates(
        &self,
        candidates: Vec<Candidate>,
        user: &User,
        context: Option<&UserContext>,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        self.rank_candidates_at(candidates, user, context, Utc::now())
            .await
    }

    /// Ranking against an explicit reference time; recency is computed
    /// relative to `now`.
    pub async fn rank_candidates_at(
        &self,
        candidates: Vec<Candidate>,
        user: &User,
        context: Option<&UserContext>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        let activities = self.store.get_user_activity(&user.id, 20).await?;
        let cf_scores = self.cf_service.get_cf_scores(&user.id).await?;

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|candidate| {
                let (score, signals) =
                    self.strategy
                        .score(&candidate, user, &activities, context, &cf_scores, now);
                ScoredCandidate {
                    candidate,
                    score,
                    signals,
                }
            })
            .collect();

        sort_by_score(&mut scored);
        apply_diversity(&mut scored);

        debug!(user_id = %user.id, ranked = scored.len(), "candidates ranked");
        Ok(scored)
    }
}

fn sort_by_score(scored: &mut [ScoredCandidate]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

/// Walks the sorted list and multiplies the score by 0.8 for every
/// candidate whose category already occurred earlier; the first
/// occurrence per category is untouched. Re-sorts afterwards. No
/// candidate is removed.
fn apply_diversity(scored: &mut [ScoredCandidate]) {
    let mut seen: HashSet<ContentCategory> = HashSet::new();
    for item in scored.iter_mut() {
        if !seen.insert(item.candidate.category) {
            item.score *= DIVERSITY_PENALTY;
        }
    }
    sort_by_score(scored);
}
