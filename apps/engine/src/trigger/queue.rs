//! Deferred-delivery queue.

use chrono::{DateTime, Utc};

use crate::models::ScoredCandidate;

/// A deferred delivery: who gets what, and not before when.
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub user_id: String,
    pub recommendation: ScoredCandidate,
    pub deliver_after: DateTime<Utc>,
    pub priority: f64,
}

/// Holds trigger decisions that were deferred, always kept sorted by
/// (deliver_after ascending, priority descending). Each entry is
/// delivered at most once.
///
/// Not internally synchronized: a host sharing the queue across tasks
/// wraps it in a mutex.
#[derive(Debug, Default)]
pub struct MessageQueue {
    entries: Vec<QueuedMessage>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts and restores the queue ordering.
    pub fn add(
        &mut self,
        user_id: &str,
        recommendation: ScoredCandidate,
        deliver_after: DateTime<Utc>,
        priority: f64,
    ) {
        self.entries.push(QueuedMessage {
            user_id: user_id.to_string(),
            recommendation,
            deliver_after,
            priority,
        });
        self.entries.sort_by(|a, b| {
            a.deliver_after.cmp(&b.deliver_after).then_with(|| {
                b.priority
                    .partial_cmp(&a.priority)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
    }

    /// Drains and returns every entry whose delivery time has passed.
    pub fn get_ready(&mut self) -> Vec<QueuedMessage> {
        self.get_ready_at(Utc::now())
    }

    /// Drain against an explicit clock.
    pub fn get_ready_at(&mut self, now: DateTime<Utc>) -> Vec<QueuedMessage> {
        let (ready, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|m| m.deliver_after <= now);
        self.entries = remaining;
        ready
    }

    /// Pending recommendations for one user, in delivery order.
    pub fn user_queue(&self, user_id: &str) -> Vec<&ScoredCandidate> {
        self.entries
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| &m.recommendation)
            .collect()
    }

    /// Removes all entries for a user; returns how many were dropped.
    pub fn clear_user(&mut self, user_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|m| m.user_id != user_id);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, ContentCategory, ContentPriority};
    use chrono::Duration;

    fn make_scored(id: &str, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate {
                id: id.to_string(),
                title: id.to_string(),
                summary: String::new(),
                category: ContentCategory::Learning,
                keywords: Vec::new(),
                source: "test".to_string(),
                engagement_score: 0.0,
                created_at: String::new(),
                content_type: "article".to_string(),
                difficulty: "intermediate".to_string(),
                priority: ContentPriority::Medium,
            },
            score,
            signals: Vec::new(),
        }
    }

    #[test]
    fn test_ordering_by_time_then_priority() {
        let mut queue = MessageQueue::new();
        let now = Utc::now();

        queue.add("u1", make_scored("late", 0.9), now + Duration::hours(2), 0.9);
        queue.add("u2", make_scored("soon-low", 0.3), now + Duration::hours(1), 0.3);
        queue.add("u3", make_scored("soon-high", 0.8), now + Duration::hours(1), 0.8);

        let ids: Vec<&str> = queue
            .entries
            .iter()
            .map(|m| m.recommendation.candidate.id.as_str())
            .collect();
        assert_eq!(ids, vec!["soon-high", "soon-low", "late"]);
    }

    #[test]
    fn test_get_ready_drains_due_entries_once() {
        let mut queue = MessageQueue::new();
        let now = Utc::now();

        queue.add("u1", make_scored("due", 0.7), now - Duration::minutes(5), 0.7);
        queue.add("u1", make_scored("future", 0.7), now + Duration::hours(1), 0.7);

        let ready = queue.get_ready_at(now);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].recommendation.candidate.id, "due");
        assert_eq!(queue.len(), 1);

        // Second drain returns nothing new.
        assert!(queue.get_ready_at(now).is_empty());
    }

    #[test]
    fn test_clear_user_counts_removed_entries() {
        let mut queue = MessageQueue::new();
        let now = Utc::now();

        queue.add("u1", make_scored("a", 0.5), now + Duration::hours(1), 0.5);
        queue.add("u1", make_scored("b", 0.5), now + Duration::hours(2), 0.5);
        queue.add("u2", make_scored("c", 0.5), now + Duration::hours(1), 0.5);

        assert_eq!(queue.clear_user("u1"), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.user_queue("u1").len(), 0);
        assert_eq!(queue.user_queue("u2").len(), 1);
    }
}
