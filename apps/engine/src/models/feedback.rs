use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User reaction to a shown candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Started,
    Dismissed,
    Ignored,
    Replied,
    DontShowLikeThis,
}

impl FeedbackAction {
    /// Engagement delta applied to the referenced candidate when this
    /// feedback is recorded. Exactly one mutation per record.
    pub fn score_delta(self) -> f64 {
        match self {
            FeedbackAction::Started => 1.0,
            FeedbackAction::Replied => 0.5,
            FeedbackAction::Dismissed => -0.3,
            FeedbackAction::Ignored => -0.1,
            FeedbackAction::DontShowLikeThis => -1.0,
        }
    }

    /// Weight this action carries in collaborative filtering and
    /// popularity counts; `None` for non-positive actions.
    pub fn positive_weight(self) -> Option<f64> {
        match self {
            FeedbackAction::Started => Some(1.0),
            FeedbackAction::Replied => Some(0.5),
            _ => None,
        }
    }
}

/// A feedback record. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    pub candidate_id: String,
    pub action: FeedbackAction,
    #[serde(default)]
    pub conversation_turns: u32,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(user_id: &str, candidate_id: &str, action: FeedbackAction) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            candidate_id: candidate_id.to_string(),
            action,
            conversation_turns: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_delta_table() {
        assert_eq!(FeedbackAction::Started.score_delta(), 1.0);
        assert_eq!(FeedbackAction::Replied.score_delta(), 0.5);
        assert_eq!(FeedbackAction::Dismissed.score_delta(), -0.3);
        assert_eq!(FeedbackAction::Ignored.score_delta(), -0.1);
        assert_eq!(FeedbackAction::DontShowLikeThis.score_delta(), -1.0);
    }

    #[test]
    fn test_positive_weights() {
        assert_eq!(FeedbackAction::Started.positive_weight(), Some(1.0));
        assert_eq!(FeedbackAction::Replied.positive_weight(), Some(0.5));
        assert_eq!(FeedbackAction::Dismissed.positive_weight(), None);
        assert_eq!(FeedbackAction::Ignored.positive_weight(), None);
        assert_eq!(FeedbackAction::DontShowLikeThis.positive_weight(), None);
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&FeedbackAction::DontShowLikeThis).unwrap();
        assert_eq!(json, "\"dont_show_like_this\"");
    }

    #[test]
    fn test_new_assigns_unique_ids() {
        let a = Feedback::new("u1", "c1", FeedbackAction::Started);
        let b = Feedback::new("u1", "c1", FeedbackAction::Started);
        assert_ne!(a.id, b.id);
    }
}
