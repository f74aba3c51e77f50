//! Ordered guard clauses for the trigger decision.
//!
//! The evaluation order is semantically load-bearing: pause always wins
//! over the time window, the window over frequency, frequency over
//! content quality, and quality over live context. Each guard returns
//! `Some(result)` to short-circuit or `None` to fall through.

use chrono::{DateTime, Duration, Utc};

use super::{TriggerDecision, TriggerResult};
use crate::models::{ScoredCandidate, User, UserContext};

/// Recommendations below this score are dropped outright.
const QUALITY_FLOOR: f64 = 0.5;
/// Receptivity below this is not worth the interruption right now.
const RECEPTIVITY_FLOOR: f64 = 0.3;
/// Context activity tag that must never be interrupted.
const DEEP_WORK: &str = "deep_work";

/// Everything a guard may inspect, precomputed once per evaluation.
pub struct GuardContext<'a> {
    pub user: &'a User,
    pub recommendation: &'a ScoredCandidate,
    pub context: Option<&'a UserContext>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
    pub current_hour: u32,
    /// Boosted queue priority. Only outcomes past the quality guard
    /// carry it; earlier guards keep the default, and the quality SKIP
    /// reports the raw score.
    pub priority: f64,
}

pub type Guard = fn(&GuardContext) -> Option<TriggerResult>;

/// The decision order. Reordering entries changes semantics.
pub const GUARDS: &[Guard] = &[
    pause_guard,
    window_guard,
    frequency_guard,
    quality_guard,
    deep_work_guard,
    receptivity_guard,
];

fn pause_guard(ctx: &GuardContext) -> Option<TriggerResult> {
    let pause_end = ctx.user.paused_until?;
    if ctx.now < pause_end {
        return Some(
            TriggerResult::new(TriggerDecision::Wait, "User has paused notifications")
                .retry_after(pause_end - ctx.now),
        );
    }
    None
}

fn window_guard(ctx: &GuardContext) -> Option<TriggerResult> {
    if ctx.user.in_preferred_window(ctx.current_hour) {
        return None;
    }
    let hours_until_open = (ctx.user.preferred_hour_start + 24 - ctx.current_hour) % 24;
    Some(
        TriggerResult::new(
            TriggerDecision::Queue,
            format!(
                "Outside preferred hours ({}:00-{}:00)",
                ctx.user.preferred_hour_start, ctx.user.preferred_hour_end
            ),
        )
        .retry_after(Duration::hours(i64::from(hours_until_open))),
    )
}

fn frequency_guard(ctx: &GuardContext) -> Option<TriggerResult> {
    // No prior message means the constraint is trivially satisfied.
    let last = ctx.last_message_at?;
    let min_interval = ctx.user.frequency.min_interval_hours() as f64;
    let hours_since = (ctx.now - last).num_seconds() as f64 / 3600.0;
    if hours_since < min_interval {
        let deficit_hours = min_interval - hours_since;
        return Some(
            TriggerResult::new(
                TriggerDecision::Wait,
                format!("Too soon since last message ({hours_since:.1}h < {min_interval:.0}h)"),
            )
            .retry_after(Duration::seconds((deficit_hours * 3600.0) as i64)),
        );
    }
    None
}

fn quality_guard(ctx: &GuardContext) -> Option<TriggerResult> {
    if ctx.recommendation.score < QUALITY_FLOOR {
        return Some(
            TriggerResult::new(
                TriggerDecision::Skip,
                format!("Recommendation score too low ({:.2})", ctx.recommendation.score),
            )
            .priority(ctx.recommendation.score),
        );
    }
    None
}

fn deep_work_guard(ctx: &GuardContext) -> Option<TriggerResult> {
    let context = ctx.context?;
    if context.current_activity == DEEP_WORK {
        return Some(
            TriggerResult::new(TriggerDecision::Queue, "User is in deep work mode")
                .retry_after(Duration::hours(1))
                .priority(ctx.priority),
        );
    }
    None
}

fn receptivity_guard(ctx: &GuardContext) -> Option<TriggerResult> {
    let context = ctx.context?;
    if context.receptivity_score < RECEPTIVITY_FLOOR {
        return Some(
            TriggerResult::new(
                TriggerDecision::Wait,
                format!("Low receptivity score ({:.2})", context.receptivity_score),
            )
            .retry_after(Duration::minutes(30))
            .priority(ctx.priority),
        );
    }
    None
}
