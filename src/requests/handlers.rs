use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreatedRequestResponse, ResolveResponse};
use super::services;
use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts/:id/requests", post(create_request))
        .route("/requests/:id/resolve/:action", post(resolve_request))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn create_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let request = services::create_request(&state, &user, post_id).await?;
    let location = format!("/api/v1/posts/{}", post_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedRequestResponse {
            message: "Your request has been sent to the donor!".into(),
            request: request.into(),
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn resolve_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, action)): Path<(Uuid, String)>,
) -> Result<Json<ResolveResponse>, AppError> {
    let outcome = services::resolve_request(&state, &user, id, &action).await?;
    Ok(Json(ResolveResponse {
        message: outcome.message,
        request: outcome.request.into(),
        post_status: outcome.post_status,
        declined_siblings: outcome.declined_siblings,
    }))
}
