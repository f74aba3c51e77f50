use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Categories for recommendable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Learning,
    Work,
    News,
    Health,
    Productivity,
}

/// Editorial priority assigned at ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// A content item that can be recommended to users.
///
/// `engagement_score` starts at zero and is mutated only through
/// feedback deltas; it has no fixed bound and is only ever compared
/// relatively. `created_at` is an RFC 3339 string straight from
/// ingestion and may be empty or malformed — consumers parse it
/// fallibly and skip recency scoring when it fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub category: ContentCategory,
    pub keywords: Vec<String>,
    pub source: String,
    #[serde(default)]
    pub engagement_score: f64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub priority: ContentPriority,
}

fn default_content_type() -> String {
    "article".to_string()
}

fn default_difficulty() -> String {
    "intermediate".to_string()
}

impl Candidate {
    /// Counts how many of the user's interests appear in this
    /// candidate's keywords (set intersection, duplicates ignored).
    pub fn matches_interests(&self, interests: &[String]) -> usize {
        let keywords: HashSet<&str> = self.keywords.iter().map(String::as_str).collect();
        let interests: HashSet<&str> = interests.iter().map(String::as_str).collect();
        keywords.intersection(&interests).count()
    }
}

/// A human-readable explanation fragment carrying the score
/// contribution it represents. Recomputed on every evaluation, never
/// persisted or shared by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub weight: f64,
}

impl Signal {
    pub fn new(kind: &str, description: impl Into<String>, weight: f64) -> Self {
        Self {
            kind: kind.to_string(),
            description: description.into(),
            weight,
        }
    }
}

/// A candidate bound to its computed relevance score and the signals
/// explaining it. Output of the ranking stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub signals: Vec<Signal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candidate(keywords: &[&str]) -> Candidate {
        Candidate {
            id: "c1".to_string(),
            title: "Async patterns in Rust".to_string(),
            summary: "A tour of structured concurrency".to_string(),
            category: ContentCategory::Learning,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            source: "blog".to_string(),
            engagement_score: 0.0,
            created_at: String::new(),
            content_type: "article".to_string(),
            difficulty: "intermediate".to_string(),
            priority: ContentPriority::Medium,
        }
    }

    #[test]
    fn test_matches_interests_counts_intersection() {
        let candidate = make_candidate(&["rust", "async", "tokio"]);
        let interests = vec!["rust".to_string(), "async".to_string(), "go".to_string()];
        assert_eq!(candidate.matches_interests(&interests), 2);
    }

    #[test]
    fn test_matches_interests_symmetric_under_reordering() {
        let a = make_candidate(&["rust", "async", "tokio"]);
        let b = make_candidate(&["tokio", "rust", "async"]);
        let interests = vec!["async".to_string(), "tokio".to_string()];
        assert_eq!(a.matches_interests(&interests), b.matches_interests(&interests));
    }

    #[test]
    fn test_matches_interests_ignores_duplicates() {
        let candidate = make_candidate(&["rust", "rust"]);
        let interests = vec!["rust".to_string(), "rust".to_string()];
        assert_eq!(candidate.matches_interests(&interests), 1);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&ContentCategory::Productivity).unwrap();
        assert_eq!(json, "\"productivity\"");
    }

    #[test]
    fn test_candidate_defaults_fill_optional_fields() {
        let candidate: Candidate = serde_json::from_str(
            r#"{"id":"c1","title":"t","summary":"s","category":"news","keywords":[],"source":"feed"}"#,
        )
        .unwrap();
        assert_eq!(candidate.engagement_score, 0.0);
        assert_eq!(candidate.content_type, "article");
        assert_eq!(candidate.difficulty, "intermediate");
        assert_eq!(candidate.priority, ContentPriority::Medium);
    }
}
