//! Migrate command - Database migration management.

use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Connect without auto-running migrations for manual control
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            tracing::info!("Applying pending migrations");
            db.run_migrations().await.map_err(migration_failed)?;
        }
        MigrateAction::Down => {
            tracing::info!("Rolling back last migration");
            db.rollback_migration().await.map_err(migration_failed)?;
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(migration_failed)?;
            let pending = status.iter().filter(|(_, applied)| !applied).count();
            for (name, applied) in &status {
                println!("{:<48} {}", name, if *applied { "applied" } else { "pending" });
            }
            tracing::info!(total = status.len(), pending, "Migration status");
            return Ok(());
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables and re-running every migration");
            db.fresh_migrations().await.map_err(migration_failed)?;
        }
    }

    tracing::info!(action = ?args.action, "Migration command completed");
    Ok(())
}

fn migration_failed(e: DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", e))
}
