use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ActivityCounts, User};

/// Find a user by id.
pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, avg_rating, num_ratings, is_admin, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find user by id")?;
    Ok(user)
}

/// Find a user by username.
pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, avg_rating, num_ratings, is_admin, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await
    .context("find user by username")?;
    Ok(user)
}

pub async fn activity_counts(db: &PgPool, user_id: Uuid) -> anyhow::Result<ActivityCounts> {
    let counts = sqlx::query_as::<_, ActivityCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM food_posts WHERE user_id = $1) AS total_donations,
            (SELECT COUNT(*) FROM food_posts WHERE user_id = $1 AND status = 'claimed')
                AS successful_pickups,
            (SELECT COUNT(*) FROM requests WHERE requester_id = $1 AND status = 'accepted')
                AS food_claimed
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("user activity counts")?;
    Ok(counts)
}
