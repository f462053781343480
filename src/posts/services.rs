use tracing::{info, warn};
use uuid::Uuid;

use super::dto::PostView;
use super::form::PostForm;
use super::repo;
use super::repo_types::{ApprovalStatus, FoodPost, PostListing, PostListingRow};
use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::images;
use crate::state::AppState;

fn into_listings(rows: Vec<PostListingRow>) -> Result<Vec<PostListing>, AppError> {
    Ok(rows
        .into_iter()
        .map(PostListing::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?)
}

async fn load_listing(st: &AppState, post_id: Uuid) -> Result<PostListing, AppError> {
    let row = repo::find_listing(&st.db, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?;
    Ok(row.try_into()?)
}

/// Attach presigned image URLs.
pub async fn to_views(st: &AppState, listings: Vec<PostListing>) -> Result<Vec<PostView>, AppError> {
    let keys: Vec<&str> = listings.iter().map(|l| l.post.image_key.as_str()).collect();
    let urls = images::presign_many(st, &keys).await?;
    Ok(listings
        .into_iter()
        .zip(urls)
        .map(|(l, url)| PostView::new(l, url))
        .collect())
}

pub async fn to_view(st: &AppState, listing: PostListing) -> Result<PostView, AppError> {
    let url = images::presign(st, &listing.post.image_key).await?;
    Ok(PostView::new(listing, url))
}

/// Unmoderated or hidden posts are only shown to their donor and to admins.
fn can_view(post: &FoodPost, viewer: &CurrentUser) -> bool {
    post.approval_status == ApprovalStatus::Approved || post.user_id == viewer.id || viewer.is_admin
}

pub async fn create_post(
    st: &AppState,
    donor: &CurrentUser,
    form: PostForm,
) -> Result<PostListing, AppError> {
    let (fields, image) = form.into_fields()?;
    let image = image.ok_or_else(|| AppError::validation("No image file was provided!"))?;

    let image_key = images::store(st, donor.id, image).await?;
    let row = match repo::insert(&st.db, donor.id, &fields, &image_key).await {
        Ok(row) => row,
        Err(e) => {
            images::discard(st, &image_key).await;
            return Err(e.into());
        }
    };

    info!(post_id = %row.id, user_id = %donor.id, "post created, pending moderation");
    Ok(PostListing {
        post: row.try_into()?,
        author_username: donor.username.clone(),
    })
}

pub async fn get_post(
    st: &AppState,
    viewer: &CurrentUser,
    post_id: Uuid,
) -> Result<PostListing, AppError> {
    let listing = load_listing(st, post_id).await?;
    if !can_view(&listing.post, viewer) {
        return Err(AppError::not_found("Post not found"));
    }
    Ok(listing)
}

pub async fn feed(st: &AppState, limit: i64, offset: i64) -> Result<Vec<PostListing>, AppError> {
    into_listings(repo::list_visible(&st.db, limit, offset).await?)
}

pub async fn list_by_user(st: &AppState, user_id: Uuid) -> Result<Vec<PostListing>, AppError> {
    into_listings(repo::list_by_user(&st.db, user_id).await?)
}

/// Update a post's fields and optionally replace its image. Owner only.
pub async fn edit_post(
    st: &AppState,
    actor: &CurrentUser,
    post_id: Uuid,
    form: PostForm,
) -> Result<PostListing, AppError> {
    let listing = load_listing(st, post_id).await?;
    if listing.post.user_id != actor.id {
        warn!(%post_id, user_id = %actor.id, "edit by non-owner");
        return Err(AppError::forbidden("You are not authorized to edit this post."));
    }

    let (fields, image) = form.into_fields()?;
    let old_key = listing.post.image_key.clone();
    let new_key = match image {
        Some(image) => Some(images::store(st, actor.id, image).await?),
        None => None,
    };
    let key = new_key.as_deref().unwrap_or(&old_key);

    if let Err(e) = repo::update_fields(&st.db, post_id, &fields, key).await {
        if let Some(k) = &new_key {
            images::discard(st, k).await;
        }
        return Err(e.into());
    }
    if new_key.is_some() {
        images::discard(st, &old_key).await;
    }

    info!(%post_id, user_id = %actor.id, image_replaced = new_key.is_some(), "post updated");
    let mut updated = listing;
    updated.post.food_name = fields.food_name;
    updated.post.description = fields.description;
    updated.post.quantity = fields.quantity;
    updated.post.phone_number = fields.phone_number;
    updated.post.city = fields.city;
    updated.post.location = fields.location;
    updated.post.image_key = key.to_string();
    Ok(updated)
}

/// Delete a post (owner or admin). The image is removed best-effort first;
/// the database delete proceeds regardless.
pub async fn delete_post(st: &AppState, actor: &CurrentUser, post_id: Uuid) -> Result<(), AppError> {
    let listing = load_listing(st, post_id).await?;
    if listing.post.user_id != actor.id && !actor.is_admin {
        warn!(%post_id, user_id = %actor.id, "delete by non-owner");
        return Err(AppError::forbidden("You are not authorized to delete this post."));
    }

    images::discard(st, &listing.post.image_key).await;
    repo::delete(&st.db, post_id).await?;
    info!(%post_id, user_id = %actor.id, by_admin = actor.is_admin, "post deleted");
    Ok(())
}

pub async fn admin_overview(
    st: &AppState,
    actor: &CurrentUser,
) -> Result<(Vec<PostListing>, Vec<PostListing>), AppError> {
    if !actor.is_admin {
        return Err(AppError::forbidden("Authorization failed."));
    }
    let pending = into_listings(repo::list_by_approval(&st.db, ApprovalStatus::Pending).await?)?;
    let approved = into_listings(repo::list_by_approval(&st.db, ApprovalStatus::Approved).await?)?;
    Ok((pending, approved))
}
