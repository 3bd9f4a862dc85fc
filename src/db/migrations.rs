//! Versioned schema migrations.
//!
//! Migrations are SQL scripts in `migrations/`, numbered consecutively from 1.
//! Applied ones are recorded (including their script) in the table
//! `__db_migrations`. A migration must never be changed once applied.

use std::time::Duration;
use tokio_postgres::{GenericClient, IsolationLevel, error::SqlState};

use crate::{prelude::*, db::util::dbargs};
use super::{Db, query};


#[derive(Debug)]
struct Migration {
    id: u64,
    name: &'static str,
    script: &'static str,
}

/// Includes the given migration scripts from the `migrations` folder.
macro_rules! migrations {
    ( $( $id:literal : $name:literal ,)+ ) => {
        &[$(
            Migration {
                id: $id,
                name: $name,
                script: include_str!(
                    concat!("migrations/", stringify!($id), "-", $name, ".sql")
                ),
            },
        )+]
    };
}

static MIGRATIONS: &[Migration] = migrations![
    01: "clients",
    02: "projects",
];


/// A migration as recorded in `__db_migrations`.
#[derive(Debug)]
struct AppliedMigration {
    id: u64,
    name: String,
    applied_on: String,
    script: String,
}

/// Returns how many of our migrations are not yet applied to the database.
/// Fails if the DB is in a state we cannot deal with, e.g. if it contains a
/// migration we don't know about. Does not modify the DB.
pub(crate) async fn unapplied_migrations(db: &impl GenericClient) -> Result<usize> {
    let applied = match load_applied(db).await? {
        None => return Ok(MIGRATIONS.len()),
        Some(applied) => applied,
    };

    check_applied(&applied)?;
    Ok(MIGRATIONS.len() - applied.len())
}

/// Loads all applied migrations ordered by ID, or returns `None` if the
/// database is completely empty.
async fn load_applied(db: &impl GenericClient) -> Result<Option<Vec<AppliedMigration>>> {
    if !query::does_table_exist(db, "__db_migrations").await? {
        // Other tables without the meta table would be fishy.
        let tables = query::all_table_names(db).await?;
        if !tables.is_empty() {
            bail!(
                "migration table '__db_migrations' does not exist, but some other \
                    tables ({}) do exist. This should not happen.",
                tables.join(", "),
            );
        }

        return Ok(None);
    }

    debug!("Checking DB migrations");
    let applied = db
        .query_raw(
            "select id, name, applied_on::text, script from __db_migrations order by id",
            dbargs![],
        )
        .await
        .context("failed to query meta migrations table")?
        .map_ok(|row| AppliedMigration {
            id: row.get::<_, i64>(0) as u64,
            name: row.get(1),
            applied_on: row.get(2),
            script: row.get(3),
        })
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Some(applied))
}

/// Makes sure the applied migrations are a prefix of `MIGRATIONS`.
fn check_applied(applied: &[AppliedMigration]) -> Result<()> {
    for (i, actual) in applied.iter().enumerate() {
        if actual.id != i as u64 + 1 {
            bail!("The IDs of the applied migrations are not consecutive. This is unexpected.");
        }

        let Some(expected) = MIGRATIONS.get(i) else {
            bail!(
                "The migration '{}-{}' is applied in the database (on {}), but no \
                    such migration is known to this application. This is unexpected.",
                actual.id,
                actual.name,
                actual.applied_on,
            );
        };

        if actual.script != expected.script {
            debug!("Expected script for '{}-{}':\n{}", expected.id, expected.name, expected.script);
            debug!("Script in database for '{}-{}':\n{}", actual.id, actual.name, actual.script);
            bail!(
                "The script of applied migration '{}-{}' (applied on {}) does not match the \
                    expected script for that migration. This is unexpected.",
                actual.id,
                actual.name,
                actual.applied_on,
            );
        }
    }

    Ok(())
}

/// Makes sure the database schema is up to date by applying all missing
/// migrations.
///
/// If anything unexpected is noticed, an error is returned and the user has
/// to deal with it manually.
pub(crate) async fn migrate(db: &mut Db) -> Result<()> {
    // Everything happens in one serializable transaction so that concurrently
    // starting processes cannot both apply migrations. Committing can then
    // fail and we retry, seeing the other process' changes.
    const BACKOFF: Duration = Duration::from_millis(500);

    loop {
        let tx = db.build_transaction()
            .isolation_level(IsolationLevel::Serializable)
            .start()
            .await?;

        let applied = load_applied(&*tx).await?;
        if applied.is_none() {
            info!("Database is empty. Creating table '__db_migrations'...");
            tx.batch_execute(include_str!("db-migrations.sql"))
                .await
                .context("could not create migrations meta table")?;
        }

        let applied = applied.unwrap_or_default();
        check_applied(&applied)?;
        apply(&*tx, &MIGRATIONS[applied.len()..]).await?;

        match tx.commit().await {
            Ok(_) => return Ok(()),

            Err(e) if e.code() == Some(&SqlState::T_R_SERIALIZATION_FAILURE) => {
                warn!(
                    "Database migration transaction failed to commit, likely because \
                        another process ran it concurrently. Trying again in {BACKOFF:?}.",
                );
                tokio::time::sleep(BACKOFF).await;
            }

            Err(e) => return Err(e.into()),
        }
    }
}

async fn apply(db: &impl GenericClient, migrations: &[Migration]) -> Result<()> {
    if migrations.is_empty() {
        info!("All migrations are already applied: database schema is up to date.");
        return Ok(());
    }

    info!("The database is missing {} migrations. Applying them now.", migrations.len());
    for migration in migrations {
        debug!("Applying migration '{}-{}' ...", migration.id, migration.name);
        trace!("Executing:\n{}", migration.script);

        db.batch_execute(migration.script)
            .await
            .with_context(|| format!(
                "failed to run script for '{}-{}'",
                migration.id,
                migration.name,
            ))?;

        db.execute(
            "insert into __db_migrations (id, name, applied_on, script) \
                values ($1, $2, now(), $3)",
            &[&(migration.id as i64), &migration.name, &migration.script],
        ).await.context("failed to update __db_migrations")?;
    }

    info!("Applied {} migrations. DB is up to date now.", migrations.len());
    Ok(())
}
