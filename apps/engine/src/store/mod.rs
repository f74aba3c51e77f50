//! Storage abstraction consumed by the engine.
//!
//! All data access goes through the [`DataStore`] trait so the durable
//! representation can be swapped without touching the pipeline. The
//! in-memory reference implementation lives in [`memory`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::{
    Candidate, ContentCategory, Feedback, FrequencyPreference, User, UserActivity,
};

/// Aggregated feedback counts for one user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total: u64,
    pub started: u64,
    pub dismissed: u64,
    pub ignored: u64,
    pub replied: u64,
}

/// Partial preferences update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PreferencesUpdate {
    pub topics_of_interest: Option<Vec<String>>,
    pub frequency: Option<FrequencyPreference>,
    pub preferred_hour_start: Option<u32>,
    pub preferred_hour_end: Option<u32>,
}

/// Read/write operations the engine needs from its storage collaborator.
///
/// Calls are atomic request/response operations: fail fast, no internal
/// retry. Implementations own their durability and I/O failure modes.
#[async_trait]
pub trait DataStore: Send + Sync {
    // Candidates

    async fn get_all_candidates(&self) -> Result<Vec<Candidate>, EngineError>;

    async fn get_candidate_by_id(&self, id: &str) -> Result<Option<Candidate>, EngineError>;

    /// Candidates whose keyword set intersects `keywords`, sorted by
    /// engagement score descending, capped at `limit`.
    async fn get_candidates_by_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<Candidate>, EngineError>;

    async fn get_candidates_by_category(
        &self,
        category: ContentCategory,
    ) -> Result<Vec<Candidate>, EngineError>;

    /// Applies `delta` to the candidate's engagement score. Unknown ids
    /// are a silent no-op.
    async fn update_candidate_score(&self, id: &str, delta: f64) -> Result<(), EngineError>;

    // Users

    async fn get_user(&self, id: &str) -> Result<Option<User>, EngineError>;

    async fn create_user(&self, user: User) -> Result<User, EngineError>;

    async fn update_user_preferences(
        &self,
        user_id: &str,
        update: PreferencesUpdate,
    ) -> Result<User, EngineError>;

    /// Snooze (`Some(until)`) or resume (`None`) proactive delivery.
    async fn set_paused_until(
        &self,
        user_id: &str,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), EngineError>;

    async fn count_users(&self) -> Result<usize, EngineError>;

    // Activity

    async fn add_user_activity(&self, activity: UserActivity) -> Result<(), EngineError>;

    /// A user's activity records, most recent first.
    async fn get_user_activity(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<UserActivity>, EngineError>;

    /// Deduplicated keywords plus lowercased query tokens mined from
    /// the user's last 20 activity records.
    async fn get_user_keywords(&self, user_id: &str) -> Result<Vec<String>, EngineError>;

    /// Most recent activity across all users.
    async fn get_recent_activity(&self, limit: usize) -> Result<Vec<UserActivity>, EngineError>;

    // Feedback

    /// Appends the record and applies the action's engagement delta to
    /// the referenced candidate.
    async fn record_feedback(&self, feedback: Feedback) -> Result<Feedback, EngineError>;

    /// Ids of candidates this user has already been shown.
    async fn get_shown_candidates(&self, user_id: &str) -> Result<Vec<String>, EngineError>;

    async fn get_feedback_stats(&self, user_id: &str) -> Result<FeedbackStats, EngineError>;

    /// Timestamp of the user's most recent feedback record, if any.
    async fn get_last_feedback_at(
        &self,
        user_id: &str,
    ) -> Result<Option<DateTime<Utc>>, EngineError>;

    async fn get_all_feedback(&self) -> Result<Vec<Feedback>, EngineError>;

    // Collaborative filtering inputs

    /// Users whose interest sets overlap the target's, by Jaccard
    /// similarity, excluding self and zero-similarity users; sorted
    /// descending.
    async fn find_similar_users(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, EngineError>;

    /// Candidates similar users engaged with positively, weighted by
    /// similarity times action weight and accumulated per candidate,
    /// excluding candidates the target has already seen; sorted
    /// descending.
    async fn get_candidates_engaged_by_similar_users(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, EngineError>;

    /// Most positively-engaged candidates across all users, as
    /// (candidate id, engagement count); sorted descending.
    async fn get_popular_candidates(&self, limit: usize)
        -> Result<Vec<(String, u64)>, EngineError>;
}
