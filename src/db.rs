use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use tracing::info;

use crate::error::AppResult;

const SQLITE_PRAGMAS: [&str; 3] =
    ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA foreign_keys=ON"];

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;

    let backend = db.get_database_backend();
    if backend == DatabaseBackend::Sqlite {
        for pragma in SQLITE_PRAGMAS {
            db.execute(Statement::from_string(backend, pragma.to_string())).await?;
        }
    }

    let pending = Migrator::get_pending_migrations(&db).await?;
    if !pending.is_empty() {
        info!(count = pending.len(), "applying pending migrations");
        Migrator::up(&db, None).await?;
    }

    Ok(db)
}
