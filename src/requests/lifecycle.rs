//! Claim arbitration for a single post.
//!
//! Decisions are computed here from a snapshot of the post and its requests;
//! `services` applies them inside one transaction.

use std::str::FromStr;

use uuid::Uuid;

use super::repo_types::{FoodRequest, RequestStatus};
use crate::error::AppError;
use crate::posts::repo_types::{ClaimStatus, FoodPost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveAction {
    Accept,
    Decline,
}

impl FromStr for ResolveAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(ResolveAction::Accept),
            "decline" => Ok(ResolveAction::Decline),
            _ => Err(AppError::state("Invalid request action.")),
        }
    }
}

/// Checks for a new request against `post`, first failure wins.
pub fn check_new_request(
    post: &FoodPost,
    requester_id: Uuid,
    already_requested: bool,
) -> Result<(), AppError> {
    if post.user_id == requester_id {
        return Err(AppError::conflict("You cannot request your own food post."));
    }
    if already_requested {
        return Err(AppError::conflict("You have already requested this item."));
    }
    if !post.is_visible() {
        return Err(AppError::state("This post is not available for requests."));
    }
    Ok(())
}

/// Only the donor who owns `post` may resolve requests on it.
pub fn ensure_post_owner(post: &FoodPost, actor_id: Uuid) -> Result<(), AppError> {
    if post.user_id != actor_id {
        return Err(AppError::forbidden(
            "You are not authorized to perform this action.",
        ));
    }
    Ok(())
}

/// Writes needed to resolve one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub request_id: Uuid,
    pub new_status: RequestStatus,
    /// Set the post to `claimed`.
    pub claim_post: bool,
    /// Pending siblings to decline.
    pub declined_siblings: Vec<Uuid>,
}

/// Decide the outcome of `action` on `target`.
///
/// `requests` is every request on the post, `target` included. Accepting
/// makes `target` the single winner: the post becomes claimed and every other
/// pending request is declined. Re-accepting the winner repeats the sweep.
pub fn plan_resolution(
    target: &FoodRequest,
    post_status: ClaimStatus,
    requests: &[FoodRequest],
    action: ResolveAction,
) -> Result<Resolution, AppError> {
    match action {
        ResolveAction::Accept => {
            let other_winner = requests
                .iter()
                .any(|r| r.id != target.id && r.status == RequestStatus::Accepted);
            let already_won = target.status == RequestStatus::Accepted;
            if other_winner || (post_status == ClaimStatus::Claimed && !already_won) {
                return Err(AppError::state("This post has already been claimed."));
            }
            let declined_siblings = requests
                .iter()
                .filter(|r| r.id != target.id && r.status == RequestStatus::Pending)
                .map(|r| r.id)
                .collect();
            Ok(Resolution {
                request_id: target.id,
                new_status: RequestStatus::Accepted,
                claim_post: true,
                declined_siblings,
            })
        }
        ResolveAction::Decline => {
            if target.status == RequestStatus::Accepted {
                return Err(AppError::state("An accepted request cannot be declined."));
            }
            Ok(Resolution {
                request_id: target.id,
                new_status: RequestStatus::Declined,
                claim_post: false,
                declined_siblings: Vec::new(),
            })
        }
    }
}

pub fn outcome_message(action: ResolveAction, requester_username: &str) -> String {
    match action {
        ResolveAction::Accept => format!(
            "You have accepted the request from {}. The post is now marked as claimed.",
            requester_username
        ),
        ResolveAction::Decline => {
            format!("You have declined the request from {}.", requester_username)
        }
    }
}
