//! Proactive delivery decisions.
//!
//! [`TriggerService`] answers WHEN (if ever) to deliver the top
//! recommendation to a user. Bad timing causes interruption fatigue and
//! opt-outs, so preference constraints always win over content quality;
//! the guard order lives in [`guards`].

pub mod guards;
pub mod queue;
pub mod receptivity;

use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::EngineError;
use crate::models::{ContentCategory, ContentPriority, ScoredCandidate, User, UserContext};
use crate::store::DataStore;
use guards::{GuardContext, GUARDS};

/// Outcome of a trigger evaluation. WAIT/QUEUE/SKIP are expected
/// results, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerDecision {
    /// Send the message now.
    Trigger,
    /// Not the right time; re-evaluate after `retry_after`.
    Wait,
    /// Hold for later delivery.
    Queue,
    /// Drop this recommendation.
    Skip,
}

const DEFAULT_PRIORITY: f64 = 0.5;

/// Decision plus the human-readable reason and retry/ordering metadata.
#[derive(Debug, Clone)]
pub struct TriggerResult {
    pub decision: TriggerDecision,
    pub reason: String,
    pub retry_after: Option<Duration>,
    pub priority: f64,
}

impl TriggerResult {
    pub(crate) fn new(decision: TriggerDecision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
            retry_after: None,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub(crate) fn retry_after(mut self, after: Duration) -> Self {
        self.retry_after = Some(after);
        self
    }

    pub(crate) fn priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }
}

pub struct TriggerService {
    store: Arc<dyn DataStore>,
}

impl TriggerService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Decides whether to deliver `recommendation` to `user` right now.
    ///
    /// Total: any input resolves to exactly one decision. Storage is
    /// consulted once, for the user's most recent feedback timestamp.
    pub async fn should_trigger(
        &self,
        user: &User,
        recommendation: &ScoredCandidate,
        context: Option<&UserContext>,
    ) -> Result<TriggerResult, EngineError> {
        let last_message_at = self.store.get_last_feedback_at(&user.id).await?;
        Ok(evaluate_at(
            user,
            recommendation,
            context,
            last_message_at,
            Utc::now(),
        ))
    }
}

/// Pure evaluation against an explicit clock (UTC); the async wrapper
/// feeds it live data. Guards run in declaration order, first match
/// wins; when none fires, the message triggers.
pub fn evaluate_at(
    user: &User,
    recommendation: &ScoredCandidate,
    context: Option<&UserContext>,
    last_message_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> TriggerResult {
    let current_hour = now.hour();
    let ctx = GuardContext {
        user,
        recommendation,
        context,
        last_message_at,
        now,
        current_hour,
        priority: compute_priority(recommendation, current_hour),
    };

    for guard in GUARDS {
        if let Some(result) = guard(&ctx) {
            debug!(decision = ?result.decision, reason = %result.reason, "trigger short-circuit");
            return result;
        }
    }

    TriggerResult::new(TriggerDecision::Trigger, "All conditions met").priority(ctx.priority)
}

/// Queue-ordering priority: the recommendation score boosted by content
/// priority (x1.3 high, x0.8 low) and by timing for work content during
/// business hours (x1.2, hours 9-17 inclusive), capped at 1.0.
pub fn compute_priority(recommendation: &ScoredCandidate, hour: u32) -> f64 {
    let mut priority = recommendation.score;

    match recommendation.candidate.priority {
        ContentPriority::High => priority *= 1.3,
        ContentPriority::Low => priority *= 0.8,
        ContentPriority::Medium => {}
    }

    if (9..=17).contains(&hour) && recommendation.candidate.category == ContentCategory::Work {
        priority *= 1.2;
    }

    priority.min(1.0)
}
