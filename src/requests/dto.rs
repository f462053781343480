use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{FoodRequest, RequestListingRow, RequestStatus};
use crate::posts::repo_types::ClaimStatus;

#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: Uuid,
    pub post_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    pub requester_id: Uuid,
    pub requester_username: String,
    pub status: RequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<FoodRequest> for RequestView {
    fn from(r: FoodRequest) -> Self {
        Self {
            id: r.id,
            post_id: r.post_id,
            food_name: None,
            requester_id: r.requester_id,
            requester_username: r.requester_username,
            status: r.status,
            created_at: r.created_at,
        }
    }
}

impl TryFrom<RequestListingRow> for RequestView {
    type Error = anyhow::Error;

    fn try_from(row: RequestListingRow) -> Result<Self, Self::Error> {
        let food_name = row.food_name;
        let mut view = RequestView::from(FoodRequest::try_from(row.request)?);
        view.food_name = Some(food_name);
        Ok(view)
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedRequestResponse {
    pub message: String,
    pub request: RequestView,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub message: String,
    pub request: RequestView,
    pub post_status: ClaimStatus,
    pub declined_siblings: usize,
}
