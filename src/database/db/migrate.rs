use anyhow::Result;
use log::info;
use sqlx::migrate::Migrator;
use sqlx::{Pool, Sqlite};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    MIGRATOR.run(pool).await?;
    info!("migrations up to date ({} known)", MIGRATOR.iter().count());
    Ok(())
}

/// Drops the expenses table together with the migration ledger,
/// so the next `run_migrations` rebuilds the schema from scratch.
pub async fn drop_schema(pool: &Pool<Sqlite>) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DROP TABLE IF EXISTS expenses")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    info!("dropped expenses table and migration history");
    Ok(())
}
