use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{ApprovalStatus, ClaimStatus, FoodPostRow, PostFields, PostListingRow};

/// Insert a new post. Claim and moderation statuses take their column defaults.
pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    fields: &PostFields,
    image_key: &str,
) -> anyhow::Result<FoodPostRow> {
    let row = sqlx::query_as::<_, FoodPostRow>(
        r#"
        INSERT INTO food_posts
            (user_id, food_name, description, quantity, phone_number, city, lat, lon, image_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, user_id, food_name, description, quantity, phone_number, city,
                  lat, lon, image_key, status, approval_status, created_at
        "#,
    )
    .bind(user_id)
    .bind(&fields.food_name)
    .bind(&fields.description)
    .bind(&fields.quantity)
    .bind(&fields.phone_number)
    .bind(&fields.city)
    .bind(fields.location.lat)
    .bind(fields.location.lon)
    .bind(image_key)
    .fetch_one(db)
    .await
    .context("insert food post")?;
    Ok(row)
}

pub async fn find_listing(db: &PgPool, id: Uuid) -> anyhow::Result<Option<PostListingRow>> {
    let row = sqlx::query_as::<_, PostListingRow>(
        r#"
        SELECT p.id, p.user_id, p.food_name, p.description, p.quantity, p.phone_number,
               p.city, p.lat, p.lon, p.image_key, p.status, p.approval_status, p.created_at,
               u.username AS author_username
          FROM food_posts p
          JOIN users u ON u.id = p.user_id
         WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find food post")?;
    Ok(row)
}

/// Lock a post row for the rest of the transaction.
pub async fn find_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> anyhow::Result<Option<FoodPostRow>> {
    let row = sqlx::query_as::<_, FoodPostRow>(
        r#"
        SELECT id, user_id, food_name, description, quantity, phone_number, city,
               lat, lon, image_key, status, approval_status, created_at
          FROM food_posts
         WHERE id = $1
           FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock food post")?;
    Ok(row)
}

/// Visible posts in storage order. Used by the nearby search.
pub async fn scan_visible(db: &PgPool) -> anyhow::Result<Vec<PostListingRow>> {
    let rows = sqlx::query_as::<_, PostListingRow>(
        r#"
        SELECT p.id, p.user_id, p.food_name, p.description, p.quantity, p.phone_number,
               p.city, p.lat, p.lon, p.image_key, p.status, p.approval_status, p.created_at,
               u.username AS author_username
          FROM food_posts p
          JOIN users u ON u.id = p.user_id
         WHERE p.status = 'available' AND p.approval_status = 'approved'
        "#,
    )
    .fetch_all(db)
    .await
    .context("scan visible posts")?;
    Ok(rows)
}

/// Visible posts, newest first.
pub async fn list_visible(
    db: &PgPool,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<PostListingRow>> {
    let rows = sqlx::query_as::<_, PostListingRow>(
        r#"
        SELECT p.id, p.user_id, p.food_name, p.description, p.quantity, p.phone_number,
               p.city, p.lat, p.lon, p.image_key, p.status, p.approval_status, p.created_at,
               u.username AS author_username
          FROM food_posts p
          JOIN users u ON u.id = p.user_id
         WHERE p.status = 'available' AND p.approval_status = 'approved'
         ORDER BY p.created_at DESC
         LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list visible posts")?;
    Ok(rows)
}

/// Posts awaiting or past moderation. Pending is reviewed oldest first.
pub async fn list_by_approval(
    db: &PgPool,
    approval: ApprovalStatus,
) -> anyhow::Result<Vec<PostListingRow>> {
    let order = match approval {
        ApprovalStatus::Pending => "ASC",
        ApprovalStatus::Approved | ApprovalStatus::Declined => "DESC",
    };
    let sql = format!(
        r#"
        SELECT p.id, p.user_id, p.food_name, p.description, p.quantity, p.phone_number,
               p.city, p.lat, p.lon, p.image_key, p.status, p.approval_status, p.created_at,
               u.username AS author_username
          FROM food_posts p
          JOIN users u ON u.id = p.user_id
         WHERE p.approval_status = $1
         ORDER BY p.created_at {order}
        "#
    );
    let rows = sqlx::query_as::<_, PostListingRow>(&sql)
        .bind(approval.as_str())
        .fetch_all(db)
        .await
        .context("list posts by approval status")?;
    Ok(rows)
}

/// All posts authored by a user, newest first.
pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<PostListingRow>> {
    let rows = sqlx::query_as::<_, PostListingRow>(
        r#"
        SELECT p.id, p.user_id, p.food_name, p.description, p.quantity, p.phone_number,
               p.city, p.lat, p.lon, p.image_key, p.status, p.approval_status, p.created_at,
               u.username AS author_username
          FROM food_posts p
          JOIN users u ON u.id = p.user_id
         WHERE p.user_id = $1
         ORDER BY p.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list posts by user")?;
    Ok(rows)
}

pub async fn update_fields(
    db: &PgPool,
    id: Uuid,
    fields: &PostFields,
    image_key: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE food_posts
           SET food_name = $2, description = $3, quantity = $4, phone_number = $5,
               city = $6, lat = $7, lon = $8, image_key = $9
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&fields.food_name)
    .bind(&fields.description)
    .bind(&fields.quantity)
    .bind(&fields.phone_number)
    .bind(&fields.city)
    .bind(fields.location.lat)
    .bind(fields.location.lon)
    .bind(image_key)
    .execute(db)
    .await
    .context("update food post")?;
    Ok(())
}

pub async fn set_approval_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    approval: ApprovalStatus,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE food_posts SET approval_status = $2 WHERE id = $1")
        .bind(id)
        .bind(approval.as_str())
        .execute(&mut **tx)
        .await
        .context("set approval status")?;
    Ok(())
}

pub async fn set_claim_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: ClaimStatus,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE food_posts SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(&mut **tx)
        .await
        .context("set claim status")?;
    Ok(())
}

/// Delete a post. Its requests go with it via `ON DELETE CASCADE`.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM food_posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete food post")?;
    Ok(res.rows_affected())
}
