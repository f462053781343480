use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{DashboardResponse, ProfileResponse};
use super::{repo, services};
use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::posts::services as posts_services;
use crate::requests::dto::RequestView;
use crate::requests::repo as requests_repo;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/:username", get(get_profile))
        .route("/me/dashboard", get(get_dashboard))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = repo::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let stats = services::load_stats(&state, profile.id).await?;
    Ok(Json(ProfileResponse {
        user: profile.into(),
        stats,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let me = repo::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let stats = services::load_stats(&state, user.id).await?;

    let posts = posts_services::list_by_user(&state, user.id).await?;
    let my_posts = posts_services::to_views(&state, posts).await?;

    let my_requests = requests_repo::list_by_requester(&state.db, user.id)
        .await?
        .into_iter()
        .map(RequestView::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let incoming_requests = requests_repo::list_for_owner(&state.db, user.id)
        .await?
        .into_iter()
        .map(RequestView::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(DashboardResponse {
        user: me.into(),
        stats,
        my_posts,
        my_requests,
        incoming_requests,
    }))
}
