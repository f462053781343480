use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{ApprovalStatus, ClaimStatus, PostListing};

/// Full post as shown on its detail page and on dashboards.
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub food_name: String,
    pub description: String,
    pub quantity: String,
    pub phone_number: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub image_url: String,
    pub status: ClaimStatus,
    pub approval_status: ApprovalStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl PostView {
    pub fn new(listing: PostListing, image_url: String) -> Self {
        let PostListing {
            post,
            author_username,
        } = listing;
        Self {
            id: post.id,
            author_id: post.user_id,
            author_username,
            food_name: post.food_name,
            description: post.description,
            quantity: post.quantity,
            phone_number: post.phone_number,
            city: post.city,
            lat: post.location.lat,
            lon: post.location.lon,
            image_url,
            status: post.status,
            approval_status: post.approval_status,
            created_at: post.created_at,
        }
    }
}

/// Nearby search hit. Deliberately omits coordinates and owner id.
#[derive(Debug, Serialize)]
pub struct NearbyPost {
    pub id: Uuid,
    pub food_name: String,
    pub description: String,
    pub quantity: String,
    pub city: String,
    pub image_url: String,
    pub author_username: String,
}

impl NearbyPost {
    pub fn new(listing: PostListing, image_url: String) -> Self {
        Self {
            id: listing.post.id,
            food_name: listing.post.food_name,
            description: listing.post.description,
            quantity: listing.post.quantity,
            city: listing.post.city,
            image_url,
            author_username: listing.author_username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub message: String,
    pub post: PostView,
}

#[derive(Debug, Serialize)]
pub struct ModerationResponse {
    pub message: String,
    pub post_id: Uuid,
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub pending_posts: Vec<PostView>,
    pub approved_posts: Vec<PostView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::repo_types::fixtures::{listing, post};

    #[test]
    fn nearby_post_hides_location_and_owner() {
        let owner = Uuid::new_v4();
        let hit = NearbyPost::new(listing(post(owner, 12.97, 77.59)), "https://img".into());
        let json = serde_json::to_value(&hit).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["author_username", "city", "description", "food_name", "id", "image_url", "quantity"]
        );
        assert!(!json.to_string().contains(&owner.to_string()));
    }

    #[test]
    fn post_view_serializes_statuses_lowercase() {
        let view = PostView::new(listing(post(Uuid::new_v4(), 1.0, 2.0)), "u".into());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["approval_status"], "approved");
        assert!(json["created_at"].is_string());
    }
}
