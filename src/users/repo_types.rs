use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as seen by this service. The credential hash is never selected.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avg_rating: f64,
    pub num_ratings: i32,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
}

/// Raw counters behind the dashboard/profile numbers.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct ActivityCounts {
    pub total_donations: i64,
    pub successful_pickups: i64,
    pub food_claimed: i64,
}
