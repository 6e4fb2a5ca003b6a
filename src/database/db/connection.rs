use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

pub async fn get_db_pool(db_url: &str, max_connections: u32) -> Result<Pool<Sqlite>, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(db_url)
        .await
}

// Round-trips to the store and returns its clock, e.g. "2025-10-25 14:03:11".
pub async fn server_time(pool: &Pool<Sqlite>) -> Result<String, sqlx::Error> {
    sqlx::query_scalar("SELECT datetime('now')")
        .fetch_one(pool)
        .await
}
