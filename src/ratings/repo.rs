use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::aggregate::{RatingStats, Score};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Rating {
    pub id: Uuid,
    /// Cleared when the rated request is deleted along with its post.
    pub request_id: Option<Uuid>,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub score: i32,
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn exists_for_request_tx(
    tx: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    from_user_id: Uuid,
) -> anyhow::Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM ratings WHERE request_id = $1 AND from_user_id = $2)",
    )
    .bind(request_id)
    .bind(from_user_id)
    .fetch_one(&mut **tx)
    .await
    .context("check existing rating")?;
    Ok(exists)
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    from_user_id: Uuid,
    to_user_id: Uuid,
    score: Score,
    comment: Option<&str>,
) -> anyhow::Result<Rating> {
    let rating = sqlx::query_as::<_, Rating>(
        r#"
        INSERT INTO ratings (request_id, from_user_id, to_user_id, score, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, request_id, from_user_id, to_user_id, score, comment, created_at
        "#,
    )
    .bind(request_id)
    .bind(from_user_id)
    .bind(to_user_id)
    .bind(score.get())
    .bind(comment)
    .fetch_one(&mut **tx)
    .await
    .context("insert rating")?;
    Ok(rating)
}

/// Read a donor's rating stats and hold the row lock until the transaction ends.
pub async fn lock_stats_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<Option<RatingStats>> {
    let stats = sqlx::query_as::<_, RatingStats>(
        r#"
        SELECT avg_rating, num_ratings, rating_total
          FROM users
         WHERE id = $1
           FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock rating stats")?;
    Ok(stats)
}

pub async fn store_stats_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    stats: &RatingStats,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
           SET avg_rating = $2, num_ratings = $3, rating_total = $4
         WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(stats.avg_rating)
    .bind(stats.num_ratings)
    .bind(stats.rating_total)
    .execute(&mut **tx)
    .await
    .context("store rating stats")?;
    Ok(())
}

/// (score, count) pairs for ratings a user has received.
pub async fn score_histogram(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<(i32, i64)>> {
    let rows = sqlx::query_as::<_, (i32, i64)>(
        r#"
        SELECT score, COUNT(*)
          FROM ratings
         WHERE to_user_id = $1
         GROUP BY score
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("rating histogram")?;
    Ok(rows)
}
