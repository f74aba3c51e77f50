//! Receptivity estimation: how likely the user is to respond well to an
//! interruption at a given hour.

use serde::Serialize;

use super::TriggerService;
use crate::errors::EngineError;
use crate::store::FeedbackStats;

/// Receptivity at or above this marks an hour as worth targeting.
const OPTIMAL_FLOOR: f64 = 0.7;

/// Adjustment applied for users with no feedback history yet.
const COLD_START_ADJUSTMENT: f64 = 0.7;

/// Base receptivity by time of day, 24h clock. Typical knowledge-worker
/// engagement: morning and mid-afternoon peaks, lunch dip, quiet nights.
pub fn time_based_receptivity(hour: u32) -> f64 {
    match hour {
        7..=8 => 0.6,
        9..=11 => 0.9,
        12..=13 => 0.5,
        14..=16 => 0.85,
        17..=19 => 0.6,
        _ => 0.3,
    }
}

fn feedback_adjustment(stats: &FeedbackStats) -> f64 {
    if stats.total > 0 {
        0.5 + 0.5 * (stats.started as f64 / stats.total as f64)
    } else {
        COLD_START_ADJUSTMENT
    }
}

/// 24-hour receptivity pattern with the hours worth targeting, for
/// surfacing engagement windows in a UI.
#[derive(Debug, Clone, Serialize)]
pub struct ReceptivityProfile {
    pub hourly: [f64; 24],
    pub optimal_hours: Vec<u32>,
}

impl TriggerService {
    /// Receptivity estimate for `user_id` at `hour`: the time-of-day
    /// curve scaled by how often this user historically engages.
    /// Cold-start users get the 0.7 default adjustment.
    pub async fn compute_receptivity(
        &self,
        user_id: &str,
        hour: u32,
    ) -> Result<f64, EngineError> {
        let stats = self.store.get_feedback_stats(user_id).await?;
        Ok(time_based_receptivity(hour) * feedback_adjustment(&stats))
    }

    /// The full daily receptivity curve for one user.
    pub async fn receptivity_profile(
        &self,
        user_id: &str,
    ) -> Result<ReceptivityProfile, EngineError> {
        let stats = self.store.get_feedback_stats(user_id).await?;
        let adjustment = feedback_adjustment(&stats);

        let mut hourly = [0.0; 24];
        for (hour, slot) in hourly.iter_mut().enumerate() {
            *slot = time_based_receptivity(hour as u32) * adjustment;
        }
        let optimal_hours = (0..24u32)
            .filter(|h| hourly[*h as usize] >= OPTIMAL_FLOOR)
            .collect();

        Ok(ReceptivityProfile {
            hourly,
            optimal_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feedback, FeedbackAction};
    use crate::store::memory::MemoryStore;
    use crate::store::DataStore;
    use std::sync::Arc;

    #[test]
    fn test_time_curve_table() {
        assert_eq!(time_based_receptivity(7), 0.6);
        assert_eq!(time_based_receptivity(8), 0.6);
        assert_eq!(time_based_receptivity(9), 0.9);
        assert_eq!(time_based_receptivity(11), 0.9);
        assert_eq!(time_based_receptivity(12), 0.5);
        assert_eq!(time_based_receptivity(14), 0.85);
        assert_eq!(time_based_receptivity(16), 0.85);
        assert_eq!(time_based_receptivity(17), 0.6);
        assert_eq!(time_based_receptivity(19), 0.6);
        assert_eq!(time_based_receptivity(20), 0.3);
        assert_eq!(time_based_receptivity(3), 0.3);
    }

    #[tokio::test]
    async fn test_cold_start_users_get_default_adjustment() {
        let service = TriggerService::new(Arc::new(MemoryStore::new()));
        let receptivity = service.compute_receptivity("newcomer", 10).await.unwrap();
        assert!((receptivity - 0.9 * 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_engaged_users_score_higher() {
        let store = Arc::new(MemoryStore::new());
        store
            .record_feedback(Feedback::new("u1", "c1", FeedbackAction::Started))
            .await
            .unwrap();
        store
            .record_feedback(Feedback::new("u1", "c2", FeedbackAction::Started))
            .await
            .unwrap();

        let service = TriggerService::new(store);
        // Every interaction started: adjustment = 0.5 + 0.5 = 1.0.
        let receptivity = service.compute_receptivity("u1", 10).await.unwrap();
        assert!((receptivity - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_profile_flags_peak_hours_for_cold_start() {
        let service = TriggerService::new(Arc::new(MemoryStore::new()));
        let profile = service.receptivity_profile("newcomer").await.unwrap();
        // 0.9 x 0.7 = 0.63 and 0.85 x 0.7 = 0.595: no hour clears 0.7
        // for a cold-start user.
        assert!(profile.optimal_hours.is_empty());
        assert!((profile.hourly[10] - 0.63).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_profile_flags_peaks_for_engaged_users() {
        let store = Arc::new(MemoryStore::new());
        store
            .record_feedback(Feedback::new("u1", "c1", FeedbackAction::Started))
            .await
            .unwrap();

        let service = TriggerService::new(store);
        let profile = service.receptivity_profile("u1").await.unwrap();
        // Adjustment 1.0: morning (9-11) and afternoon (14-16) peaks
        // clear the floor.
        assert_eq!(profile.optimal_hours, vec![9, 10, 11, 14, 15, 16]);
    }
}
