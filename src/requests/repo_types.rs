use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Declined => "declined",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "declined" => Ok(RequestStatus::Declined),
            other => anyhow::bail!("unknown request status {other:?}"),
        }
    }
}

/// `requests` row joined with the requester's username.
#[derive(Debug, Clone, FromRow)]
pub struct RequestRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub requester_id: Uuid,
    pub requester_username: String,
    pub status: String,
    pub created_at: OffsetDateTime,
}

/// Request plus the post it targets, for dashboards.
#[derive(Debug, Clone, FromRow)]
pub struct RequestListingRow {
    #[sqlx(flatten)]
    pub request: RequestRow,
    pub food_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodRequest {
    pub id: Uuid,
    pub post_id: Uuid,
    pub requester_id: Uuid,
    pub requester_username: String,
    pub status: RequestStatus,
    pub created_at: OffsetDateTime,
}

impl TryFrom<RequestRow> for FoodRequest {
    type Error = anyhow::Error;

    fn try_from(r: RequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            post_id: r.post_id,
            requester_id: r.requester_id,
            requester_username: r.requester_username,
            status: r.status.parse()?,
            created_at: r.created_at,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn request(post_id: Uuid, status: RequestStatus) -> FoodRequest {
        FoodRequest {
            id: Uuid::new_v4(),
            post_id,
            requester_id: Uuid::new_v4(),
            requester_username: "hungry".into(),
            status,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
