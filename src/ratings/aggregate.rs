//! Donor rating statistics.
//!
//! The running sum of scores is stored next to the rounded average, so each
//! update is exact: the average always equals the rounded mean of every
//! score the donor has received.

use uuid::Uuid;

use crate::error::AppError;
use crate::requests::repo_types::{FoodRequest, RequestStatus};

/// A score in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score(i32);

impl Score {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = AppError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&v) {
            Ok(Score(v as i32))
        } else {
            Err(AppError::validation("Score must be between 1 and 5"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, sqlx::FromRow)]
pub struct RatingStats {
    pub avg_rating: f64,
    pub num_ratings: i32,
    pub rating_total: i64,
}

/// Round to two decimals.
///
/// Formatting rounds the exact binary value, so a mean such as 43/40 (stored
/// as 1.07499...) becomes 1.07, and true ties like 0.125 go to even.
pub fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}

/// Checks before `rater_id` may rate `request`, first failure wins.
pub fn check_rating(
    request: &FoodRequest,
    rater_id: Uuid,
    already_rated: bool,
) -> Result<(), AppError> {
    if request.requester_id != rater_id {
        return Err(AppError::forbidden("You can only rate requests you made."));
    }
    if request.status != RequestStatus::Accepted {
        return Err(AppError::state("You can only rate completed pickups."));
    }
    if already_rated {
        return Err(AppError::conflict("You have already rated this pickup."));
    }
    Ok(())
}

impl RatingStats {
    /// Stats after one more score.
    pub fn record(&self, score: Score) -> RatingStats {
        let num_ratings = self.num_ratings + 1;
        let rating_total = self.rating_total + score.get() as i64;
        RatingStats {
            avg_rating: round2(rating_total as f64 / num_ratings as f64),
            num_ratings,
            rating_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(v: i64) -> Score {
        Score::try_from(v).unwrap()
    }

    fn replay(scores: &[i64]) -> RatingStats {
        scores
            .iter()
            .fold(RatingStats::default(), |acc, &s| acc.record(score(s)))
    }

    #[test]
    fn scores_outside_one_to_five_are_rejected() {
        for bad in [0, 6, -1, 100] {
            assert!(matches!(Score::try_from(bad), Err(AppError::Validation(_))));
        }
        for good in 1..=5 {
            assert_eq!(score(good).get(), good as i32);
        }
    }

    #[test]
    fn four_then_five() {
        let first = RatingStats::default().record(score(4));
        assert_eq!(first.avg_rating, 4.0);
        assert_eq!(first.num_ratings, 1);

        let second = first.record(score(5));
        assert_eq!(second.avg_rating, 4.5);
        assert_eq!(second.num_ratings, 2);
    }

    #[test]
    fn incremental_average_matches_full_history_mean() {
        let histories: &[&[i64]] = &[
            &[1, 1, 2],
            &[1, 1, 2, 5],
            &[5, 4, 4, 3, 1, 2, 5, 5, 4],
            &[3; 7],
            &[1, 2, 3, 4, 5, 1, 2, 3, 4, 5, 1],
            &[2, 2, 2, 1, 1, 1, 5, 5, 5, 4, 3, 3, 2, 1, 4, 4, 5],
        ];
        for scores in histories {
            let stats = replay(scores);
            let mean = scores.iter().sum::<i64>() as f64 / scores.len() as f64;
            assert_eq!(stats.avg_rating, round2(mean), "history {scores:?}");
            assert_eq!(stats.num_ratings as usize, scores.len());
            assert_eq!(stats.rating_total, scores.iter().sum::<i64>());
        }
    }

    #[test]
    fn classic_formula_agrees_when_previous_average_is_exact() {
        let before = replay(&[4, 5]);
        let after = before.record(score(3));
        let classic = round2(
            (before.avg_rating * before.num_ratings as f64 + 3.0) / (before.num_ratings + 1) as f64,
        );
        assert_eq!(after.avg_rating, classic);
        assert_eq!(after.avg_rating, 4.0);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round2(1.0 / 8.0), 0.12);
        assert_eq!(round2(3.0 / 8.0), 0.38);
        assert_eq!(round2(4.0 / 3.0), 1.33);
        assert_eq!(round2(5.0 / 3.0), 1.67);
        assert_eq!(round2(43.0 / 40.0), 1.07);
        assert_eq!(round2(57.0 / 40.0), 1.43);
    }

    #[test]
    fn decimal_tie_means_round_on_the_stored_value() {
        let mut scores = vec![1; 37];
        scores.extend([2, 2, 2]);
        assert_eq!(replay(&scores).avg_rating, 1.07);
    }

    #[test]
    fn rating_checks_run_in_order() {
        use crate::requests::repo_types::fixtures::request;

        let pending = request(Uuid::new_v4(), RequestStatus::Pending);
        let stranger = Uuid::new_v4();

        // Not the requester wins over every later failure.
        let err = check_rating(&pending, stranger, true).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // Requester, but the pickup never completed.
        let err = check_rating(&pending, pending.requester_id, true).unwrap_err();
        assert!(matches!(err, AppError::State(_)));

        let declined = request(Uuid::new_v4(), RequestStatus::Declined);
        let err = check_rating(&declined, declined.requester_id, false).unwrap_err();
        assert!(matches!(err, AppError::State(_)));

        let accepted = request(Uuid::new_v4(), RequestStatus::Accepted);
        let err = check_rating(&accepted, accepted.requester_id, true).unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("already rated")));

        assert!(check_rating(&accepted, accepted.requester_id, false).is_ok());
    }
}
