use tracing::{info, warn};
use uuid::Uuid;

use super::lifecycle::{
    check_new_request, ensure_post_owner, outcome_message, plan_resolution, ResolveAction,
};
use super::repo;
use super::repo_types::{FoodRequest, RequestStatus};
use crate::error::{is_unique_violation, AppError};
use crate::identity::CurrentUser;
use crate::posts::repo as posts_repo;
use crate::posts::repo_types::{ClaimStatus, FoodPost};
use crate::state::AppState;

/// File a pending request on a visible post.
///
/// Runs under the post's row lock, the same lock `resolve_request` takes, so
/// a request can never land on a post that an accept just claimed.
pub async fn create_request(
    st: &AppState,
    requester: &CurrentUser,
    post_id: Uuid,
) -> Result<FoodRequest, AppError> {
    let mut tx = st.db.begin().await?;

    let post: FoodPost = posts_repo::find_for_update_tx(&mut tx, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?
        .try_into()?;

    let already_requested = repo::find_by_pair_tx(&mut tx, requester.id, post_id)
        .await?
        .is_some();
    if let Err(e) = check_new_request(&post, requester.id, already_requested) {
        warn!(%post_id, user_id = %requester.id, reason = %e, "request rejected");
        return Err(e);
    }

    let row = match repo::insert_tx(&mut tx, post_id, requester.id).await {
        Ok(row) => row,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::conflict("You have already requested this item."));
        }
        Err(e) => return Err(e.into()),
    };
    tx.commit().await?;

    info!(request_id = %row.id, %post_id, user_id = %requester.id, "request created");
    Ok(row.try_into()?)
}

#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub request: FoodRequest,
    pub post_status: ClaimStatus,
    pub declined_siblings: usize,
    pub message: String,
}

/// Accept or decline a request on the caller's post.
///
/// The post row and then all of its request rows are locked, so two owners'
/// actions on the same post serialize and siblings are swept atomically.
pub async fn resolve_request(
    st: &AppState,
    owner: &CurrentUser,
    request_id: Uuid,
    action: &str,
) -> Result<ResolveOutcome, AppError> {
    let mut tx = st.db.begin().await?;

    let post_id = repo::find_by_id_tx(&mut tx, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Request not found"))?
        .post_id;
    let post: FoodPost = posts_repo::find_for_update_tx(&mut tx, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?
        .try_into()?;

    if let Err(e) = ensure_post_owner(&post, owner.id) {
        warn!(%request_id, user_id = %owner.id, "resolve by non-owner");
        return Err(e);
    }
    let action: ResolveAction = action.parse()?;

    let requests = repo::list_by_post_for_update_tx(&mut tx, post_id)
        .await?
        .into_iter()
        .map(FoodRequest::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let target = requests
        .iter()
        .find(|r| r.id == request_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Request not found"))?;

    let plan = plan_resolution(&target, post.status, &requests, action)?;

    repo::set_status_tx(&mut tx, &[plan.request_id], plan.new_status).await?;
    let post_status = if plan.claim_post {
        posts_repo::set_claim_status_tx(&mut tx, post_id, ClaimStatus::Claimed).await?;
        ClaimStatus::Claimed
    } else {
        post.status
    };
    repo::set_status_tx(&mut tx, &plan.declined_siblings, RequestStatus::Declined).await?;

    tx.commit().await?;

    info!(
        %request_id,
        %post_id,
        status = plan.new_status.as_str(),
        declined = plan.declined_siblings.len(),
        "request resolved"
    );
    let message = outcome_message(action, &target.requester_username);
    Ok(ResolveOutcome {
        request: FoodRequest {
            status: plan.new_status,
            ..target
        },
        post_status,
        declined_siblings: plan.declined_siblings.len(),
        message,
    })
}
