use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often the user wants proactive suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyPreference {
    Rarely,
    #[default]
    Sometimes,
    Often,
}

impl FrequencyPreference {
    /// Minimum hours between proactive messages for this preference.
    pub fn min_interval_hours(self) -> i64 {
        match self {
            FrequencyPreference::Rarely => 72,
            FrequencyPreference::Sometimes => 24,
            FrequencyPreference::Often => 4,
        }
    }
}

/// User profile: identity plus delivery preferences.
///
/// `preferred_hour_start`/`preferred_hour_end` define a half-open
/// [start, end) daily window on the 24h clock; start > end wraps past
/// midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub topics_of_interest: Vec<String>,
    #[serde(default)]
    pub frequency: FrequencyPreference,
    #[serde(default = "default_hour_start")]
    pub preferred_hour_start: u32,
    #[serde(default = "default_hour_end")]
    pub preferred_hour_end: u32,
    #[serde(default)]
    pub paused_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_hour_start() -> u32 {
    9
}

fn default_hour_end() -> u32 {
    18
}

impl User {
    /// Ephemeral profile substituted when a user id is unknown. Carries
    /// the catch-all "general" interest so retrieval still has a query.
    pub fn anonymous(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Anonymous".to_string(),
            email: String::new(),
            topics_of_interest: vec!["general".to_string()],
            frequency: FrequencyPreference::default(),
            preferred_hour_start: default_hour_start(),
            preferred_hour_end: default_hour_end(),
            paused_until: None,
            created_at: None,
        }
    }

    /// Whether `hour` falls inside the preferred [start, end) window,
    /// wrapping past midnight when start > end.
    pub fn in_preferred_window(&self, hour: u32) -> bool {
        if self.preferred_hour_start <= self.preferred_hour_end {
            self.preferred_hour_start <= hour && hour < self.preferred_hour_end
        } else {
            hour >= self.preferred_hour_start || hour < self.preferred_hour_end
        }
    }
}

/// A single user activity event. Append-only; enriches retrieval and
/// ranking with recent-behavior keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivity {
    pub user_id: String,
    pub activity_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub related_id: Option<String>,
}

/// Request-scoped snapshot of what the user is doing right now.
/// Constructed per evaluation, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub current_activity: String,
    pub recent_topics: Vec<String>,
    /// Seconds since the user last interacted with the assistant.
    pub time_since_last_interaction: i64,
    pub receptivity_score: f64,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            current_activity: "browsing".to_string(),
            recent_topics: Vec::new(),
            time_since_last_interaction: 0,
            receptivity_score: 0.5,
        }
    }
}
