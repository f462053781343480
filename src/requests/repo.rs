use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{RequestListingRow, RequestRow, RequestStatus};

/// Insert a pending request. A second request for the same (requester, post)
/// pair trips the unique constraint.
pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    post_id: Uuid,
    requester_id: Uuid,
) -> anyhow::Result<RequestRow> {
    let row = sqlx::query_as::<_, RequestRow>(
        r#"
        WITH inserted AS (
            INSERT INTO requests (post_id, requester_id)
            VALUES ($1, $2)
            RETURNING id, post_id, requester_id, status, created_at
        )
        SELECT i.id, i.post_id, i.requester_id, u.username AS requester_username,
               i.status, i.created_at
          FROM inserted i
          JOIN users u ON u.id = i.requester_id
        "#,
    )
    .bind(post_id)
    .bind(requester_id)
    .fetch_one(&mut **tx)
    .await
    .context("insert request")?;
    Ok(row)
}

pub async fn find_by_pair_tx(
    tx: &mut Transaction<'_, Postgres>,
    requester_id: Uuid,
    post_id: Uuid,
) -> anyhow::Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM requests WHERE requester_id = $1 AND post_id = $2",
    )
    .bind(requester_id)
    .bind(post_id)
    .fetch_optional(&mut **tx)
    .await
    .context("find request by requester and post")?;
    Ok(id)
}

pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> anyhow::Result<Option<RequestRow>> {
    let row = sqlx::query_as::<_, RequestRow>(
        r#"
        SELECT r.id, r.post_id, r.requester_id, u.username AS requester_username,
               r.status, r.created_at
          FROM requests r
          JOIN users u ON u.id = r.requester_id
         WHERE r.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .context("find request")?;
    Ok(row)
}

/// Every request on a post, locked. Callers must already hold the post lock.
pub async fn list_by_post_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    post_id: Uuid,
) -> anyhow::Result<Vec<RequestRow>> {
    let rows = sqlx::query_as::<_, RequestRow>(
        r#"
        SELECT r.id, r.post_id, r.requester_id, u.username AS requester_username,
               r.status, r.created_at
          FROM requests r
          JOIN users u ON u.id = r.requester_id
         WHERE r.post_id = $1
         ORDER BY r.created_at ASC
           FOR UPDATE OF r
        "#,
    )
    .bind(post_id)
    .fetch_all(&mut **tx)
    .await
    .context("lock requests by post")?;
    Ok(rows)
}

pub async fn set_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
    status: RequestStatus,
) -> anyhow::Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let res = sqlx::query("UPDATE requests SET status = $2 WHERE id = ANY($1)")
        .bind(ids)
        .bind(status.as_str())
        .execute(&mut **tx)
        .await
        .context("set request status")?;
    Ok(res.rows_affected())
}

/// Requests a user has made, newest first.
pub async fn list_by_requester(
    db: &PgPool,
    requester_id: Uuid,
) -> anyhow::Result<Vec<RequestListingRow>> {
    let rows = sqlx::query_as::<_, RequestListingRow>(
        r#"
        SELECT r.id, r.post_id, r.requester_id, u.username AS requester_username,
               r.status, r.created_at, p.food_name
          FROM requests r
          JOIN users u ON u.id = r.requester_id
          JOIN food_posts p ON p.id = r.post_id
         WHERE r.requester_id = $1
         ORDER BY r.created_at DESC
        "#,
    )
    .bind(requester_id)
    .fetch_all(db)
    .await
    .context("list requests by requester")?;
    Ok(rows)
}

/// Requests received on any of the owner's posts, oldest first.
pub async fn list_for_owner(db: &PgPool, owner_id: Uuid) -> anyhow::Result<Vec<RequestListingRow>> {
    let rows = sqlx::query_as::<_, RequestListingRow>(
        r#"
        SELECT r.id, r.post_id, r.requester_id, u.username AS requester_username,
               r.status, r.created_at, p.food_name
          FROM requests r
          JOIN users u ON u.id = r.requester_id
          JOIN food_posts p ON p.id = r.post_id
         WHERE p.user_id = $1
         ORDER BY r.created_at ASC
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
    .context("list requests for owner")?;
    Ok(rows)
}
