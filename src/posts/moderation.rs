use std::str::FromStr;

use tracing::{info, warn};
use uuid::Uuid;

use super::repo;
use super::repo_types::{ApprovalStatus, FoodPost};
use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Decline,
}

impl FromStr for ModerationAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ModerationAction::Approve),
            "decline" => Ok(ModerationAction::Decline),
            _ => Err(AppError::state("Invalid verification action.")),
        }
    }
}

impl ModerationAction {
    fn target(self) -> ApprovalStatus {
        match self {
            ModerationAction::Approve => ApprovalStatus::Approved,
            ModerationAction::Decline => ApprovalStatus::Declined,
        }
    }

    pub fn outcome_message(self, food_name: &str) -> String {
        match self {
            ModerationAction::Approve => {
                format!("Post '{}' approved and is now live.", food_name)
            }
            ModerationAction::Decline => {
                format!("Post '{}' declined and will not be shown.", food_name)
            }
        }
    }
}

/// Next approval status, or `None` when the decision is already in effect.
///
/// `Approved` and `Declined` are terminal.
pub fn transition(
    current: ApprovalStatus,
    action: ModerationAction,
) -> Result<Option<ApprovalStatus>, AppError> {
    let target = action.target();
    match current {
        ApprovalStatus::Pending => Ok(Some(target)),
        done if done == target => Ok(None),
        done => Err(AppError::state(format!(
            "Post has already been {}.",
            done.as_str()
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct ModerationOutcome {
    pub post_id: Uuid,
    pub approval_status: ApprovalStatus,
    pub message: String,
}

pub async fn moderate_post(
    st: &AppState,
    actor: &CurrentUser,
    post_id: Uuid,
    action: &str,
) -> Result<ModerationOutcome, AppError> {
    if !actor.is_admin {
        warn!(user_id = %actor.id, %post_id, "non-admin moderation attempt");
        return Err(AppError::forbidden("Authorization failed."));
    }

    let mut tx = st.db.begin().await?;
    let post: FoodPost = repo::find_for_update_tx(&mut tx, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?
        .try_into()?;

    let action: ModerationAction = action.parse()?;
    let next = transition(post.approval_status, action)?;
    if let Some(status) = next {
        repo::set_approval_status_tx(&mut tx, post.id, status).await?;
    }
    tx.commit().await?;

    let approval_status = next.unwrap_or(post.approval_status);
    info!(%post_id, admin_id = %actor.id, status = approval_status.as_str(), "post moderated");
    Ok(ModerationOutcome {
        post_id,
        approval_status,
        message: action.outcome_message(&post.food_name),
    })
}
