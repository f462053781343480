use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{AdminOverview, ModerationResponse, NearbyPost, PostResponse, PostView};
use super::form::PostForm;
use super::moderation::moderate_post;
use super::nearby::{find_nearby, NearbySearch};
use super::services;
use crate::dto::{MessageResponse, Pagination};
use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::images;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_feed))
        .route("/posts/:id", get(get_post))
        .route("/nearby_posts", get(nearby_posts))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id", axum::routing::put(edit_post).delete(delete_post))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/posts", get(admin_overview))
        .route("/admin/posts/:id/:action", post(moderate))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_feed(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<PostView>>, AppError> {
    let (limit, offset) = p.bounds();
    let listings = services::feed(&state, limit, offset).await?;
    Ok(Json(services::to_views(&state, listings).await?))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PostView>, AppError> {
    let listing = services::get_post(&state, &user, id).await?;
    Ok(Json(services::to_view(&state, listing).await?))
}

/// GET /nearby_posts?lat=..&lon=..&radius_km=..
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn nearby_posts(
    State(state): State<AppState>,
    user: CurrentUser,
    search: NearbySearch,
) -> Result<Json<Vec<NearbyPost>>, AppError> {
    let hits = find_nearby(&state, &search).await?;
    let keys: Vec<&str> = hits.iter().map(|h| h.post.image_key.as_str()).collect();
    let urls = images::presign_many(&state, &keys).await?;
    Ok(Json(
        hits.into_iter()
            .zip(urls)
            .map(|(h, url)| NearbyPost::new(h, url))
            .collect(),
    ))
}

/// POST /posts (multipart): food_name, description, quantity, phone_number,
/// city, lat, lon, image
#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    mp: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = PostForm::from_multipart(mp).await?;
    let listing = services::create_post(&state, &user, form).await?;
    let location = format!("/api/v1/posts/{}", listing.post.id);
    let post = services::to_view(&state, listing).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PostResponse {
            message: "Food post request sent to admin!".into(),
            post,
        }),
    ))
}

#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn edit_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<PostResponse>, AppError> {
    let form = PostForm::from_multipart(mp).await?;
    let listing = services::edit_post(&state, &user, id, form).await?;
    Ok(Json(PostResponse {
        message: "Your post has been updated!".into(),
        post: services::to_view(&state, listing).await?,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete_post(&state, &user, id).await?;
    Ok(Json(MessageResponse {
        message: "The post has been deleted.".into(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn admin_overview(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AdminOverview>, AppError> {
    let (pending, approved) = services::admin_overview(&state, &user).await?;
    Ok(Json(AdminOverview {
        pending_posts: services::to_views(&state, pending).await?,
        approved_posts: services::to_views(&state, approved).await?,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn moderate(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, action)): Path<(Uuid, String)>,
) -> Result<Json<ModerationResponse>, AppError> {
    let outcome = moderate_post(&state, &user, id, &action).await?;
    Ok(Json(ModerationResponse {
        message: outcome.message,
        post_id: outcome.post_id,
        approval_status: outcome.approval_status,
    }))
}
