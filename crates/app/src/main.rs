use std::str::FromStr;

use migration::{Migrator, MigratorTrait};
use sea_orm::{
    DatabaseConnection, SqlxSqliteConnector,
    sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use settings::Database;

const MEMORY_URL: &str = "sqlite::memory:";

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "reporting={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    let db = parse_database(&server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    if settings.fixtures.load {
        if engine.user_count().await? == 0 {
            engine.load_fixtures().await?;
        } else {
            tracing::info!("store already populated, skipping fixtures");
        }
    }

    let addr = format!("{}:{}", server.bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

/// Pool settings for the in-memory store.
///
/// The database lives only as long as its single connection, so the pool must
/// keep that connection open for the whole process.
fn memory_pool_options() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

async fn connect_memory(
    options: SqlitePoolOptions,
) -> Result<DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let pool = options
        .connect_with(SqliteConnectOptions::from_str(MEMORY_URL)?)
        .await?;
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

async fn parse_database(
    config: &Database,
) -> Result<DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = match config {
        Database::Memory => {
            tracing::info!("using in-memory store");
            connect_memory(memory_pool_options()).await?
        }
        Database::Sqlite(path) => {
            let url = format!("sqlite:{}?mode=rwc", path);
            tracing::info!("connecting to {url}");
            sea_orm::Database::connect(url).await?
        }
    };

    Migrator::up(&database, None).await?;
    Ok(database)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn memory_pool_never_recycles_its_connection() {
        let options = memory_pool_options();

        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[tokio::test]
    async fn memory_store_keeps_rows_between_queries() {
        let db = parse_database(&Database::Memory).await.unwrap();
        let engine = engine::Engine::builder().database(db).build().await.unwrap();
        engine.load_fixtures().await.unwrap();

        let before = engine.sum_of_all_totals().await.unwrap();
        // Every query checks the connection out and hands it back to the pool.
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(engine.user_count().await.unwrap(), 5);
        }
        let after = engine.sum_of_all_totals().await.unwrap();

        assert_eq!(before.to_string(), "5699.00");
        assert_eq!(after, before);
    }
}
