use std::collections::BTreeMap;

use uuid::Uuid;

use super::repo;
use super::repo_types::ActivityCounts;
use crate::error::AppError;
use crate::ratings::repo as ratings_repo;
use crate::state::AppState;

/// Donation and rating numbers shown on dashboards and profiles.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UserStats {
    pub total_donations: i64,
    pub successful_pickups: i64,
    pub currently_available: i64,
    pub food_claimed: i64,
    /// Received ratings per score, every score from 1 to 5 present.
    pub rating_counts: BTreeMap<i32, i64>,
}

impl UserStats {
    pub fn new(counts: ActivityCounts, histogram: &[(i32, i64)]) -> Self {
        let mut rating_counts: BTreeMap<i32, i64> = (1..=5).map(|s| (s, 0)).collect();
        for &(score, n) in histogram {
            if let Some(slot) = rating_counts.get_mut(&score) {
                *slot += n;
            }
        }
        Self {
            total_donations: counts.total_donations,
            successful_pickups: counts.successful_pickups,
            currently_available: counts.total_donations - counts.successful_pickups,
            food_claimed: counts.food_claimed,
            rating_counts,
        }
    }
}

pub async fn load_stats(st: &AppState, user_id: Uuid) -> Result<UserStats, AppError> {
    let counts = repo::activity_counts(&st.db, user_id).await?;
    let histogram = ratings_repo::score_histogram(&st.db, user_id).await?;
    Ok(UserStats::new(counts, &histogram))
}
