//! Standalone migration runner for the settlement database.
//!
//! Usage: set DATABASE_URL (defaults to settlement.db) and run.

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::env;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "settlement.db".to_string());
    println!("Applying migrations to {database_url}");

    let mut conn = SqliteConnection::establish(&database_url)
        .context("Failed to open settlement database")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;

    if applied.is_empty() {
        println!("Database is up to date");
    } else {
        for version in applied {
            println!("Applied migration {version}");
        }
    }

    Ok(())
}
