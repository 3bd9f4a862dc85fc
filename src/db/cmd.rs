use std::{
    convert::Infallible,
    io,
    os::unix::process::CommandExt,
    path::{Path, PathBuf},
    process::Command,
};
use secrecy::ExposeSecret;
use deadpool_postgres::Transaction;
use tokio_postgres::IsolationLevel;

use crate::{prelude::*, config::Config};
use super::{Db, DbConfig, create_pool, query};


#[derive(Debug, clap::Subcommand)]
pub(crate) enum DbCommand {
    /// Removes all data and tables from the database.
    Clear,

    /// Runs an `.sql` script with the configured database connection.
    Script {
        /// Path to a file containing an SQL script.
        script: PathBuf,
    },

    /// Runs the database migrations that also automatically run when starting
    /// the server.
    Migrate,

    /// Connects to the database and gives you an SQL prompt.
    /// This just starts the `psql` client, so make sure that is installed
    /// and accessible in your `PATH`.
    Console,

    /// Equivalent to `db clear` followed by `db migrate`.
    Reset,
}

/// Entry point for `db` commands.
pub(crate) async fn run(cmd: &DbCommand, config: &Config) -> Result<()> {
    if let DbCommand::Console = cmd {
        return console(&config.db).map(|never| match never {});
    }

    // Connect to database
    let pool = create_pool(&config.db).await?;
    let mut db = pool.get().await?;

    // Dispatch command
    match cmd {
        DbCommand::Clear => clear(&mut db, config).await?,
        DbCommand::Migrate => super::migrate(&mut db).await?,
        DbCommand::Reset => {
            clear(&mut db, config).await?;
            super::migrate(&mut db).await?;
        }
        DbCommand::Script { script } => run_script(&db, script).await?,
        DbCommand::Console => unreachable!("already handled above"),
    }

    Ok(())
}


/// Clears the whole database by removing and re-creating the `public` schema.
///
/// The user has to confirm this interactively. Otherwise an error is returned
/// and the database is not changed.
async fn clear(db: &mut Db, config: &Config) -> Result<()> {
    let tx = db.build_transaction()
        .isolation_level(IsolationLevel::Serializable)
        .start()
        .await?;

    warn!("You are about to delete all clients, projects and everything else in \
        the 'public' schema of the database!");
    print_summary(&tx, &config.db).await?;

    println!();
    println!("Are you sure you want to completely remove everything in this database? \
        Please double-check the server you are running this on!\n\
        Type 'yes' to proceed to delete the data.");
    crate::cmd::prompt_for_yes()?;

    tx.batch_execute(&format!(
        "drop schema public cascade;\
        create schema public;\
        grant all on schema public to {};\
        grant all on schema public to public;",
        config.db.user,
    )).await.context("failed to drop and recreate schema 'public'")?;
    tx.commit().await.context("failed to commit clear transaction")?;

    info!("Dropped and recreated schema 'public'");

    Ok(())
}

/// Prints where we are connected to and how many rows each table has.
async fn print_summary(tx: &Transaction<'_>, config: &DbConfig) -> Result<()> {
    println!();
    if let Ok(Ok(hostname)) = hostname::get().map(|n| n.into_string()) {
        println!("Hostname: {hostname}");
    }
    println!("Database: {} on {}:{}", config.database, config.host, config.port);

    println!();
    println!("The database currently holds these tables:");
    for name in query::all_table_names(&**tx).await? {
        let num_rows = tx.query_one(&*format!("select count(*) from \"{name}\""), &[])
            .await?
            .get::<_, i64>(0);
        println!(" - {name} ({num_rows} rows)");
    }

    Ok(())
}

async fn run_script(db: &Db, script_path: &Path) -> Result<()> {
    let script = tokio::fs::read_to_string(script_path)
        .await
        .context(format!("failed to read script file '{}'", script_path.display()))?;

    db.batch_execute(&script).await.context("failed to execute script")?;
    info!("Successfully ran SQL script");

    Ok(())
}

fn console(config: &DbConfig) -> Result<Infallible> {
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
    let encode = |s| utf8_percent_encode(s, NON_ALPHANUMERIC);

    let connection_uri = format!(
        "postgresql://{}:{}@{}:{}/{}",
        encode(&config.user),
        encode(config.password.expose_secret()),
        config.host,
        config.port,
        encode(&config.database),
    );
    let error = Command::new("psql").arg(connection_uri).exec();
    let message = match error.kind() {
        io::ErrorKind::NotFound => "`psql` was not found in your `PATH`",
        io::ErrorKind::PermissionDenied => "you don't have sufficient permissions to execute `psql`",
        _ => "an error occurred while trying to execute `psql`",
    };
    Err(error).context(message)
}
