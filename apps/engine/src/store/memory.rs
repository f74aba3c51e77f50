//! In-memory reference implementation of [`DataStore`].
//!
//! Used by tests and by hosts that have not wired a database. All state
//! lives behind a single `RwLock`; feedback insert and the engagement
//! delta it drives happen under one write guard so they stay atomic.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{DataStore, FeedbackStats, PreferencesUpdate};
use crate::errors::EngineError;
use crate::models::{Candidate, ContentCategory, Feedback, User, UserActivity};

#[derive(Default)]
struct Inner {
    candidates: Vec<Candidate>,
    users: Vec<User>,
    activity: Vec<UserActivity>,
    feedback: Vec<Feedback>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the candidate pool.
    pub async fn seed_candidates(&self, candidates: Vec<Candidate>) {
        self.inner.write().await.candidates = candidates;
    }

    /// Replaces the user set.
    pub async fn seed_users(&self, users: Vec<User>) {
        self.inner.write().await.users = users;
    }
}

fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Descending by score, ties broken by id for determinism.
fn sort_scored_desc(items: &mut [(String, f64)]) {
    items.sort_by(|x, y| {
        y.1.partial_cmp(&x.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.0.cmp(&y.0))
    });
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get_all_candidates(&self) -> Result<Vec<Candidate>, EngineError> {
        Ok(self.inner.read().await.candidates.clone())
    }

    async fn get_candidate_by_id(&self, id: &str) -> Result<Option<Candidate>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn get_candidates_by_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<Candidate>, EngineError> {
        let wanted: HashSet<&str> = keywords.iter().map(String::as_str).collect();
        let inner = self.inner.read().await;
        let mut matched: Vec<Candidate> = inner
            .candidates
            .iter()
            .filter(|c| c.keywords.iter().any(|k| wanted.contains(k.as_str())))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.engagement_score
                .partial_cmp(&a.engagement_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matched.truncate(limit);
        Ok(matched)
    }

    async fn get_candidates_by_category(
        &self,
        category: ContentCategory,
    ) -> Result<Vec<Candidate>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .candidates
            .iter()
            .filter(|c| c.category == category)
            .cloned()
            .collect())
    }

    async fn update_candidate_score(&self, id: &str, delta: f64) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        if let Some(candidate) = inner.candidates.iter_mut().find(|c| c.id == id) {
            candidate.engagement_score += delta;
        }
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, mut user: User) -> Result<User, EngineError> {
        if user.created_at.is_none() {
            user.created_at = Some(Utc::now());
        }
        self.inner.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn update_user_preferences(
        &self,
        user_id: &str,
        update: PreferencesUpdate,
    ) -> Result<User, EngineError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;
        if let Some(topics) = update.topics_of_interest {
            user.topics_of_interest = topics;
        }
        if let Some(frequency) = update.frequency {
            user.frequency = frequency;
        }
        if let Some(start) = update.preferred_hour_start {
            user.preferred_hour_start = start;
        }
        if let Some(end) = update.preferred_hour_end {
            user.preferred_hour_end = end;
        }
        Ok(user.clone())
    }

    async fn set_paused_until(
        &self,
        user_id: &str,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;
        user.paused_until = until;
        Ok(())
    }

    async fn count_users(&self) -> Result<usize, EngineError> {
        Ok(self.inner.read().await.users.len())
    }

    async fn add_user_activity(&self, activity: UserActivity) -> Result<(), EngineError> {
        self.inner.write().await.activity.push(activity);
        Ok(())
    }

    async fn get_user_activity(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<UserActivity>, EngineError> {
        let inner = self.inner.read().await;
        let mut activities: Vec<UserActivity> = inner
            .activity
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        activities.truncate(limit);
        Ok(activities)
    }

    async fn get_user_keywords(&self, user_id: &str) -> Result<Vec<String>, EngineError> {
        let activities = self.get_user_activity(user_id, 20).await?;
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();
        for activity in &activities {
            for keyword in &activity.keywords {
                if seen.insert(keyword.clone()) {
                    keywords.push(keyword.clone());
                }
            }
            if let Some(query) = &activity.query {
                for token in query.to_lowercase().split_whitespace() {
                    if seen.insert(token.to_string()) {
                        keywords.push(token.to_string());
                    }
                }
            }
        }
        Ok(keywords)
    }

    async fn get_recent_activity(&self, limit: usize) -> Result<Vec<UserActivity>, EngineError> {
        let inner = self.inner.read().await;
        let mut activities = inner.activity.clone();
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        activities.truncate(limit);
        Ok(activities)
    }

    async fn record_feedback(&self, feedback: Feedback) -> Result<Feedback, EngineError> {
        let mut inner = self.inner.write().await;
        let delta = feedback.action.score_delta();
        if let Some(candidate) = inner
            .candidates
            .iter_mut()
            .find(|c| c.id == feedback.candidate_id)
        {
            candidate.engagement_score += delta;
        }
        inner.feedback.push(feedback.clone());
        Ok(feedback)
    }

    async fn get_shown_candidates(&self, user_id: &str) -> Result<Vec<String>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .feedback
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.candidate_id.clone())
            .collect())
    }

    async fn get_feedback_stats(&self, user_id: &str) -> Result<FeedbackStats, EngineError> {
        use crate::models::FeedbackAction;

        let inner = self.inner.read().await;
        let mut stats = FeedbackStats::default();
        for feedback in inner.feedback.iter().filter(|f| f.user_id == user_id) {
            stats.total += 1;
            match feedback.action {
                FeedbackAction::Started => stats.started += 1,
                FeedbackAction::Dismissed => stats.dismissed += 1,
                FeedbackAction::Ignored => stats.ignored += 1,
                FeedbackAction::Replied => stats.replied += 1,
                FeedbackAction::DontShowLikeThis => {}
            }
        }
        Ok(stats)
    }

    async fn get_last_feedback_at(
        &self,
        user_id: &str,
    ) -> Result<Option<DateTime<Utc>>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .feedback
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.created_at)
            .max())
    }

    async fn get_all_feedback(&self) -> Result<Vec<Feedback>, EngineError> {
        Ok(self.inner.read().await.feedback.clone())
    }

    async fn find_similar_users(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, EngineError> {
        let inner = self.inner.read().await;
        let Some(target) = inner.users.iter().find(|u| u.id == user_id) else {
            return Ok(Vec::new());
        };
        let target_interests: HashSet<&str> = target
            .topics_of_interest
            .iter()
            .map(String::as_str)
            .collect();
        if target_interests.is_empty() {
            return Ok(Vec::new());
        }

        let mut similarities: Vec<(String, f64)> = Vec::new();
        for other in inner.users.iter().filter(|u| u.id != user_id) {
            let other_interests: HashSet<&str> = other
                .topics_of_interest
                .iter()
                .map(String::as_str)
                .collect();
            if other_interests.is_empty() {
                continue;
            }
            let similarity = jaccard(&target_interests, &other_interests);
            if similarity > 0.0 {
                similarities.push((other.id.clone(), similarity));
            }
        }

        sort_scored_desc(&mut similarities);
        similarities.truncate(limit);
        Ok(similarities)
    }

    async fn get_candidates_engaged_by_similar_users(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, EngineError> {
        let similar_users = self.find_similar_users(user_id, 10).await?;
        if similar_users.is_empty() {
            return Ok(Vec::new());
        }
        let seen_by_target: HashSet<String> =
            self.get_shown_candidates(user_id).await?.into_iter().collect();

        let inner = self.inner.read().await;
        let mut scores: HashMap<String, f64> = HashMap::new();
        for (similar_id, similarity) in &similar_users {
            for feedback in inner.feedback.iter().filter(|f| &f.user_id == similar_id) {
                let Some(weight) = feedback.action.positive_weight() else {
                    continue;
                };
                if seen_by_target.contains(&feedback.candidate_id) {
                    continue;
                }
                *scores.entry(feedback.candidate_id.clone()).or_insert(0.0) +=
                    similarity * weight;
            }
        }

        let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
        sort_scored_desc(&mut ranked);
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn get_popular_candidates(
        &self,
        limit: usize,
    ) -> Result<Vec<(String, u64)>, EngineError> {
        let inner = self.inner.read().await;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for feedback in &inner.feedback {
            if feedback.action.positive_weight().is_some() {
                *counts.entry(feedback.candidate_id.clone()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentPriority, FeedbackAction};
    use chrono::Duration;

    fn make_candidate(id: &str, keywords: &[&str], engagement: f64) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: format!("title {id}"),
            summary: format!("summary {id}"),
            category: ContentCategory::Learning,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            source: "test".to_string(),
            engagement_score: engagement,
            created_at: String::new(),
            content_type: "article".to_string(),
            difficulty: "intermediate".to_string(),
            priority: ContentPriority::Medium,
        }
    }

    fn make_user(id: &str, interests: &[&str]) -> User {
        User {
            topics_of_interest: interests.iter().map(|i| i.to_string()).collect(),
            ..User::anonymous(id)
        }
    }

    fn make_activity(user_id: &str, keywords: &[&str], query: Option<&str>, age_hours: i64) -> UserActivity {
        UserActivity {
            user_id: user_id.to_string(),
            activity_type: "search".to_string(),
            timestamp: Utc::now() - Duration::hours(age_hours),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            query: query.map(str::to_string),
            related_id: None,
        }
    }

    #[tokio::test]
    async fn test_keyword_fetch_sorts_by_engagement_and_caps() {
        let store = MemoryStore::new();
        store
            .seed_candidates(vec![
                make_candidate("low", &["rust"], 1.0),
                make_candidate("high", &["rust"], 5.0),
                make_candidate("mid", &["rust"], 3.0),
                make_candidate("other", &["go"], 9.0),
            ])
            .await;

        let found = store
            .get_candidates_by_keywords(&["rust".to_string()], 2)
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid"]);
    }

    #[tokio::test]
    async fn test_feedback_applies_engagement_delta_once() {
        let store = MemoryStore::new();
        store.seed_candidates(vec![make_candidate("c1", &[], 0.0)]).await;

        store
            .record_feedback(Feedback::new("u1", "c1", FeedbackAction::Started))
            .await
            .unwrap();
        store
            .record_feedback(Feedback::new("u1", "c1", FeedbackAction::Dismissed))
            .await
            .unwrap();

        let candidate = store.get_candidate_by_id("c1").await.unwrap().unwrap();
        assert!((candidate.engagement_score - 0.7).abs() < 1e-9);
        assert_eq!(store.get_shown_candidates("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_similar_users_jaccard_ordering() {
        let store = MemoryStore::new();
        store
            .seed_users(vec![
                make_user("target", &["kafka", "ml"]),
                make_user("half", &["kafka"]),
                make_user("closer", &["ml", "kafka", "k8s"]),
                make_user("stranger", &["cooking"]),
            ])
            .await;

        let similar = store.find_similar_users("target", 10).await.unwrap();
        // Jaccard: closer = 2/3, half = 1/2; stranger excluded at zero.
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].0, "closer");
        assert!((similar[0].1 - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(similar[1].0, "half");
        assert!((similar[1].1 - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_engaged_by_similar_users_excludes_already_seen() {
        let store = MemoryStore::new();
        store
            .seed_users(vec![
                make_user("target", &["rust"]),
                make_user("peer", &["rust"]),
            ])
            .await;
        store
            .seed_candidates(vec![
                make_candidate("fresh", &["rust"], 0.0),
                make_candidate("seen", &["rust"], 0.0),
            ])
            .await;

        store
            .record_feedback(Feedback::new("peer", "fresh", FeedbackAction::Started))
            .await
            .unwrap();
        store
            .record_feedback(Feedback::new("peer", "seen", FeedbackAction::Started))
            .await
            .unwrap();
        store
            .record_feedback(Feedback::new("target", "seen", FeedbackAction::Ignored))
            .await
            .unwrap();

        let engaged = store
            .get_candidates_engaged_by_similar_users("target", 10)
            .await
            .unwrap();
        assert_eq!(engaged.len(), 1);
        assert_eq!(engaged[0].0, "fresh");
        // peer similarity 1.0 x started weight 1.0
        assert!((engaged[0].1 - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_popular_candidates_counts_positive_actions_only() {
        let store = MemoryStore::new();
        store
            .record_feedback(Feedback::new("u1", "hot", FeedbackAction::Started))
            .await
            .unwrap();
        store
            .record_feedback(Feedback::new("u2", "hot", FeedbackAction::Replied))
            .await
            .unwrap();
        store
            .record_feedback(Feedback::new("u3", "cold", FeedbackAction::Dismissed))
            .await
            .unwrap();

        let popular = store.get_popular_candidates(10).await.unwrap();
        assert_eq!(popular, vec![("hot".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_user_keywords_merge_activity_and_query_tokens() {
        let store = MemoryStore::new();
        store
            .add_user_activity(make_activity("u1", &["kafka"], Some("Stream Processing"), 1))
            .await
            .unwrap();
        store
            .add_user_activity(make_activity("u1", &["kafka", "ml"], None, 2))
            .await
            .unwrap();

        let keywords = store.get_user_keywords("u1").await.unwrap();
        for expected in ["kafka", "ml", "stream", "processing"] {
            assert!(keywords.contains(&expected.to_string()), "missing {expected}");
        }
        assert_eq!(keywords.iter().filter(|k| *k == "kafka").count(), 1);
    }

    #[tokio::test]
    async fn test_last_feedback_at_picks_most_recent() {
        let store = MemoryStore::new();
        let mut old = Feedback::new("u1", "c1", FeedbackAction::Started);
        old.created_at = Utc::now() - Duration::hours(30);
        let mut recent = Feedback::new("u1", "c2", FeedbackAction::Ignored);
        recent.created_at = Utc::now() - Duration::hours(2);
        store.record_feedback(old).await.unwrap();
        store.record_feedback(recent.clone()).await.unwrap();

        let last = store.get_last_feedback_at("u1").await.unwrap().unwrap();
        assert_eq!(last, recent.created_at);
        assert!(store.get_last_feedback_at("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snooze_sets_and_clears_pause() {
        let store = MemoryStore::new();
        store.create_user(make_user("u1", &["rust"])).await.unwrap();
        let until = Utc::now() + Duration::hours(4);

        store.set_paused_until("u1", Some(until)).await.unwrap();
        assert_eq!(store.get_user("u1").await.unwrap().unwrap().paused_until, Some(until));

        store.set_paused_until("u1", None).await.unwrap();
        assert!(store.get_user("u1").await.unwrap().unwrap().paused_until.is_none());

        let missing = store.set_paused_until("ghost", None).await;
        assert!(matches!(missing, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_user_stamps_created_at() {
        let store = MemoryStore::new();
        let created = store.create_user(make_user("u1", &[])).await.unwrap();
        assert!(created.created_at.is_some());
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_category_lookup() {
        let store = MemoryStore::new();
        let mut news = make_candidate("n1", &[], 0.0);
        news.category = ContentCategory::News;
        store
            .seed_candidates(vec![news, make_candidate("l1", &[], 0.0)])
            .await;

        let found = store
            .get_candidates_by_category(ContentCategory::News)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "n1");
    }

    #[tokio::test]
    async fn test_preferences_update_is_partial() {
        let store = MemoryStore::new();
        store.seed_users(vec![make_user("u1", &["rust"])]).await;

        let updated = store
            .update_user_preferences(
                "u1",
                PreferencesUpdate {
                    preferred_hour_start: Some(7),
                    ..PreferencesUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.preferred_hour_start, 7);
        assert_eq!(updated.preferred_hour_end, 18);
        assert_eq!(updated.topics_of_interest, vec!["rust".to_string()]);

        let missing = store
            .update_user_preferences("ghost", PreferencesUpdate::default())
            .await;
        assert!(matches!(missing, Err(EngineError::NotFound(_))));
    }
}
