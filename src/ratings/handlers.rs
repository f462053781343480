use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::aggregate::Score;
use super::dto::{DonorRating, RatingResponse, SubmitRatingRequest};
use super::services;
use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/requests/:id/rating", post(submit_rating))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn submit_rating(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(request_id): Path<Uuid>,
    payload: Result<Json<SubmitRatingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RatingResponse>), AppError> {
    let Json(body) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let score = Score::try_from(body.score)?;

    let outcome = services::submit_rating(&state, &user, request_id, score, body.comment).await?;
    Ok((
        StatusCode::CREATED,
        Json(RatingResponse {
            message: "Thank you for your feedback!".into(),
            rating: outcome.rating,
            donor: DonorRating {
                avg_rating: outcome.donor_stats.avg_rating,
                num_ratings: outcome.donor_stats.num_ratings,
            },
        }),
    ))
}
