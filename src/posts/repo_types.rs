use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::geo::Coordinates;

/// Claim status of a post, driven by request resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Available,
    Claimed,
}

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Available => "available",
            ClaimStatus::Claimed => "claimed",
        }
    }
}

impl FromStr for ClaimStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ClaimStatus::Available),
            "claimed" => Ok(ClaimStatus::Claimed),
            other => anyhow::bail!("unknown claim status {other:?}"),
        }
    }
}

/// Moderation status; only `Approved` posts are publicly visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Declined,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Declined => "declined",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "declined" => Ok(ApprovalStatus::Declined),
            other => anyhow::bail!("unknown approval status {other:?}"),
        }
    }
}

/// Row as stored in `food_posts`; statuses are plain text columns.
#[derive(Debug, Clone, FromRow)]
pub struct FoodPostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub description: String,
    pub quantity: String,
    pub phone_number: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub image_key: String,
    pub status: String,
    pub approval_status: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct PostListingRow {
    #[sqlx(flatten)]
    pub post: FoodPostRow,
    pub author_username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub description: String,
    pub quantity: String,
    pub phone_number: String,
    pub city: String,
    pub location: Coordinates,
    pub image_key: String,
    pub status: ClaimStatus,
    pub approval_status: ApprovalStatus,
    pub created_at: OffsetDateTime,
}

impl FoodPost {
    /// Discoverable through the feed and the nearby search.
    pub fn is_visible(&self) -> bool {
        self.status == ClaimStatus::Available && self.approval_status == ApprovalStatus::Approved
    }
}

impl TryFrom<FoodPostRow> for FoodPost {
    type Error = anyhow::Error;

    fn try_from(r: FoodPostRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            food_name: r.food_name,
            description: r.description,
            quantity: r.quantity,
            phone_number: r.phone_number,
            city: r.city,
            location: Coordinates {
                lat: r.lat,
                lon: r.lon,
            },
            image_key: r.image_key,
            status: r.status.parse()?,
            approval_status: r.approval_status.parse()?,
            created_at: r.created_at,
        })
    }
}

/// A post together with its donor's username.
#[derive(Debug, Clone, PartialEq)]
pub struct PostListing {
    pub post: FoodPost,
    pub author_username: String,
}

impl TryFrom<PostListingRow> for PostListing {
    type Error = anyhow::Error;

    fn try_from(r: PostListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            post: r.post.try_into()?,
            author_username: r.author_username,
        })
    }
}

/// Validated, donor-editable fields of a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFields {
    pub food_name: String,
    pub description: String,
    pub quantity: String,
    pub phone_number: String,
    pub city: String,
    pub location: Coordinates,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn post(owner: Uuid, lat: f64, lon: f64) -> FoodPost {
        FoodPost {
            id: Uuid::new_v4(),
            user_id: owner,
            food_name: "Rice and dal".into(),
            description: "Cooked this evening, serves four".into(),
            quantity: "4 portions".into(),
            phone_number: "+91 98450 12345".into(),
            city: "Bengaluru".into(),
            location: Coordinates { lat, lon },
            image_key: format!("posts/{owner}/img.jpg"),
            status: ClaimStatus::Available,
            approval_status: ApprovalStatus::Approved,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn listing(post: FoodPost) -> PostListing {
        PostListing {
            post,
            author_username: "donor".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_round_trip_through_their_column_text() {
        for s in [ClaimStatus::Available, ClaimStatus::Claimed] {
            assert_eq!(s.as_str().parse::<ClaimStatus>().unwrap(), s);
        }
        for s in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Declined,
        ] {
            assert_eq!(s.as_str().parse::<ApprovalStatus>().unwrap(), s);
        }
        assert!("gone".parse::<ClaimStatus>().is_err());
        assert!("maybe".parse::<ApprovalStatus>().is_err());
    }

    #[test]
    fn only_available_and_approved_is_visible() {
        let mut p = fixtures::post(Uuid::new_v4(), 0.0, 0.0);
        assert!(p.is_visible());
        p.approval_status = ApprovalStatus::Pending;
        assert!(!p.is_visible());
        p.approval_status = ApprovalStatus::Declined;
        assert!(!p.is_visible());
        p.approval_status = ApprovalStatus::Approved;
        p.status = ClaimStatus::Claimed;
        assert!(!p.is_visible());
    }
}
