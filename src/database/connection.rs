//! PostgreSQL connection
//!
//! Pool creation and schema migrations.

use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Create the pool and bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    info!("🗄️ Connecting to database {}", mask_database_url(&config.url));
    let pool = config.create_pool().await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply the migrations in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("✅ Database migrations applied");
    Ok(())
}

/// Hide credentials when logging a connection URL
pub fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
