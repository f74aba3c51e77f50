//! Aggregate engagement reporting over the whole store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::EngineError;
use crate::models::ContentCategory;
use crate::store::DataStore;

/// How many recent activity entries the report surfaces.
const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: ContentCategory,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub user_id: String,
    pub activity_type: String,
    pub timestamp: DateTime<Utc>,
}

/// Point-in-time snapshot of pool size and engagement health.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub total_candidates: usize,
    pub total_users: usize,
    pub total_feedback: usize,
    /// Share of feedback that was positive (started or replied).
    pub engagement_rate: f64,
    pub top_categories: Vec<CategoryCount>,
    pub recent_activity: Vec<ActivitySummary>,
}

pub async fn compute_analytics(store: &dyn DataStore) -> Result<AnalyticsReport, EngineError> {
    let candidates = store.get_all_candidates().await?;
    let total_users = store.count_users().await?;
    let feedback = store.get_all_feedback().await?;
    let recent = store.get_recent_activity(RECENT_ACTIVITY_LIMIT).await?;

    let engaged = feedback
        .iter()
        .filter(|f| f.action.positive_weight().is_some())
        .count();
    let engagement_rate = if feedback.is_empty() {
        0.0
    } else {
        engaged as f64 / feedback.len() as f64
    };

    let mut counts: HashMap<ContentCategory, usize> = HashMap::new();
    for candidate in &candidates {
        *counts.entry(candidate.category).or_insert(0) += 1;
    }
    let mut top_categories: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    top_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

    Ok(AnalyticsReport {
        total_candidates: candidates.len(),
        total_users,
        total_feedback: feedback.len(),
        engagement_rate,
        top_categories,
        recent_activity: recent
            .into_iter()
            .map(|a| ActivitySummary {
                user_id: a.user_id,
                activity_type: a.activity_type,
                timestamp: a.timestamp,
            })
            .collect(),
    })
}
