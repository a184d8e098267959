//! Shared helpers for unit tests: an in-memory database with the schema
//! applied, plus minimal row factories.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::database::manager;

/// Fresh in-memory database. One connection: every handle must see the same
/// memory store.
pub async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    manager::migrate(&pool).await.expect("schema");
    pool
}

pub async fn insert_user(pool: &SqlitePool, email: &str, name: &str) -> i64 {
    sqlx::query("INSERT INTO users (email, name) VALUES (?, ?)")
        .bind(email)
        .bind(name)
        .execute(pool)
        .await
        .expect("insert user")
        .last_insert_rowid()
}

pub async fn insert_org(pool: &SqlitePool, name: &str) -> i64 {
    let owner_id = insert_user(pool, &format!("{}@example.com", name.to_lowercase().replace(' ', ".")), name).await;
    sqlx::query("INSERT INTO organizations (name, owner_id) VALUES (?, ?)")
        .bind(name)
        .bind(owner_id)
        .execute(pool)
        .await
        .expect("insert org")
        .last_insert_rowid()
}

/// Database plus one organization to hang reviews off.
pub async fn pool_with_org() -> (SqlitePool, i64) {
    let pool = pool().await;
    let org_id = insert_org(&pool, "Test Org").await;
    (pool, org_id)
}
