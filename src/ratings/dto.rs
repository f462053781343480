use serde::{Deserialize, Serialize};

use super::repo::Rating;

#[derive(Debug, Deserialize)]
pub struct SubmitRatingRequest {
    pub score: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DonorRating {
    pub avg_rating: f64,
    pub num_ratings: i32,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub message: String,
    pub rating: Rating,
    pub donor: DonorRating,
}
