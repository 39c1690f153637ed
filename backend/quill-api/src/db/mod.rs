/// Database access layer
///
/// Free functions over `&PgPool`, one module per aggregate. All SQL lives
/// here; services combine these calls with policy checks and never touch
/// sqlx directly.
pub mod comment_repo;
pub mod post_repo;
pub mod user_repo;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create the connection pool and bring the schema up to date.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}
