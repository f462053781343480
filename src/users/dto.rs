use serde::Serialize;
use uuid::Uuid;

use super::repo_types::User;
use super::services::UserStats;
use crate::posts::dto::PostView;
use crate::requests::dto::RequestView;

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub avg_rating: f64,
    pub num_ratings: i32,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            avg_rating: u.avg_rating,
            num_ratings: u.num_ratings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: PublicUser,
    pub stats: UserStats,
    pub my_posts: Vec<PostView>,
    pub my_requests: Vec<RequestView>,
    /// Requests other users made on my posts.
    pub incoming_requests: Vec<RequestView>,
}
