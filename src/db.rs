use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::{path::{Path, PathBuf}, time::Duration};
use tokio::fs;

pub const LOCAL_MIGRATIONS: &str = "migrations/local";
pub const REMOTE_MIGRATIONS: &str = "migrations/remote";

/// Create a SeaORM connection. In-memory SQLite is pinned to a single
/// connection so every query sees the same database.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Minimal migration runner that executes the SQL files of `dir` in filename order.
pub async fn run_migrations(conn: &DatabaseConnection, dir: impl AsRef<Path>) -> Result<()> {
    let mut entries = fs::read_dir(dir.as_ref()).await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        tracing::debug!(file = %file.display(), "applying migration");
        let sql = fs::read_to_string(&file).await?;
        // Prepared statements cannot contain multiple commands,
        // so split the migration file and run each statement individually.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            let statement = format!("{stmt};");
            conn.execute(Statement::from_string(backend, statement))
                .await?;
        }
    }

    Ok(())
}

/// Connect to both stores and bring their schemas up to date.
pub async fn connect_stores(
    local_url: &str,
    remote_url: &str,
) -> Result<(DatabaseConnection, DatabaseConnection)> {
    let local = create_orm_conn(local_url).await?;
    run_migrations(&local, LOCAL_MIGRATIONS).await?;
    let remote = create_orm_conn(remote_url).await?;
    run_migrations(&remote, REMOTE_MIGRATIONS).await?;
    Ok((local, remote))
}
