use tracing::{info, warn};
use uuid::Uuid;

use super::aggregate::{check_rating, RatingStats, Score};
use super::repo::{self, Rating};
use crate::error::{is_unique_violation, AppError};
use crate::identity::CurrentUser;
use crate::posts::repo as posts_repo;
use crate::requests::repo as requests_repo;
use crate::requests::repo_types::FoodRequest;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct RatingOutcome {
    pub rating: Rating,
    pub donor_stats: RatingStats,
}

/// Record a requester's rating of a completed pickup and fold it into the
/// donor's stats. This is the only writer of a user's rating fields.
pub async fn submit_rating(
    st: &AppState,
    rater: &CurrentUser,
    request_id: Uuid,
    score: Score,
    comment: Option<String>,
) -> Result<RatingOutcome, AppError> {
    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let mut tx = st.db.begin().await?;

    let request: FoodRequest = requests_repo::find_by_id_tx(&mut tx, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Request not found"))?
        .try_into()?;

    let already_rated = repo::exists_for_request_tx(&mut tx, request_id, rater.id).await?;
    if let Err(e) = check_rating(&request, rater.id, already_rated) {
        warn!(%request_id, user_id = %rater.id, reason = %e, "rating rejected");
        return Err(e);
    }

    let donor_id = posts_repo::find_for_update_tx(&mut tx, request.post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?
        .user_id;

    let current = repo::lock_stats_tx(&mut tx, donor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Donor not found"))?;

    let rating = match repo::insert_tx(
        &mut tx,
        request_id,
        rater.id,
        donor_id,
        score,
        comment.as_deref(),
    )
    .await
    {
        Ok(r) => r,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::conflict("You have already rated this pickup."));
        }
        Err(e) => return Err(e.into()),
    };

    let donor_stats = current.record(score);
    repo::store_stats_tx(&mut tx, donor_id, &donor_stats).await?;
    tx.commit().await?;

    info!(
        rating_id = %rating.id,
        %request_id,
        %donor_id,
        score = score.get(),
        avg_rating = donor_stats.avg_rating,
        num_ratings = donor_stats.num_ratings,
        "rating recorded"
    );
    Ok(RatingOutcome {
        rating,
        donor_stats,
    })
}
