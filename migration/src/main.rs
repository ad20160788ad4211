use std::time::Duration;

use migration::Migrator;
use sea_orm_migration::{
    MigratorTrait,
    sea_orm::{Database, DatabaseConnection, DbErr},
};
use tracing::{debug, error, info, warn};

const MAX_ATTEMPTS: u32 = 5;
const BACKOFF_STEP: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Direction {
    Up,
    Down,
}

impl Direction {
    fn parse(arg: Option<&str>) -> Result<Self, String> {
        match arg.map(str::to_ascii_lowercase).as_deref() {
            None | Some("up") => Ok(Direction::Up),
            Some("down") => Ok(Direction::Down),
            Some(other) => Err(format!("unknown migration direction '{other}', expected up|down")),
        }
    }
}

#[async_std::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "debug,sqlx=warn".to_string()),
        )
        .init();

    info!("starting db migrator");

    let arg = std::env::args().nth(1);
    let direction = match Direction::parse(arg.as_deref()) {
        Ok(direction) => direction,
        Err(msg) => {
            error!("{msg}");
            std::process::exit(2);
        },
    };

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        error!("DATABASE_URL must be set");
        std::process::exit(2);
    };

    let result = run(&database_url, direction).await;
    info!("db migrator shutting down");
    if let Err(err) = result {
        error!(error = %err, "db migrator terminated unexpectedly");
        std::process::exit(1);
    }
}

async fn run(database_url: &str, direction: Direction) -> Result<(), DbErr> {
    let db = connect_with_retry(database_url).await?;

    match direction {
        Direction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?;
            if pending.is_empty() {
                warn!("no applicable migrations to apply up");
                return Ok(());
            }
            for migration in &pending {
                debug!(name = %migration.name(), "pending migration");
            }
            info!(count = pending.len(), "executing all pending migrations");
            Migrator::up(&db, None).await
        },
        Direction::Down => {
            let applied = Migrator::get_applied_migrations(&db).await?;
            if applied.is_empty() {
                warn!("no applicable migrations to roll back");
                return Ok(());
            }
            info!("rolling back one step");
            Migrator::down(&db, Some(1)).await
        },
    }
}

async fn connect_with_retry(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut attempt = 0;
    loop {
        match Database::connect(database_url).await {
            Ok(db) => return Ok(db),
            Err(err) if attempt < MAX_ATTEMPTS && is_transient(&err) => {
                attempt += 1;
                let wait = BACKOFF_STEP * attempt;
                warn!(
                    attempt,
                    error = %err,
                    "failed to connect, waiting {}s and retrying",
                    wait.as_secs()
                );
                async_std::task::sleep(wait).await;
            },
            Err(err) => return Err(err),
        }
    }
}

fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}
