use std::ops::Deref;
use deadpool_postgres::Pool;
use secrecy::ExposeSecret;
use tokio_postgres::{Client, NoTls};

use crate::{prelude::*, model::Key, store::Store};
use super::super::{DbConfig, create_pool, get_conn, migrate};


const DEV_CONFIG: &str = "util/dev-config/config.toml";

async fn conn(config: &DbConfig) -> Result<Client, tokio_postgres::Error> {
    let (client, connection) = tokio_postgres::config::Config::new()
        .user(&config.user)
        .password(config.password.expose_secret())
        .dbname(&config.database)
        .host(&config.host)
        .port(config.port)
        .application_name("project-tracker DB tests")
        .connect(NoTls)
        .await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            panic!("PG connection error: {e}");
        }
    });

    Ok(client)
}

/// A temporary DB used for a single unit test, accessed through a
/// [`Store::Db`]. Is removed on drop.
///
/// Be sure to use the multi threaded Tokio runtime or else `drop` will hang
/// indefinitely!
pub(super) struct TestDb {
    store: Option<Store>,
    pool: Pool,
    controller: Client,
    db_name: String,
}

impl TestDb {
    /// Creates a new temporary database with connection data from the dev
    /// config and runs all migrations on it. Returns `None` if no database
    /// server is reachable, in which case the calling test has nothing to do.
    pub(super) async fn with_migrations() -> Result<Option<Self>> {
        let config = crate::config::Config::load_from(DEV_CONFIG)
            .context("failed to load config")?;

        // Create connection to original database and create a new temporary one.
        let controller = match conn(&config.db).await {
            Ok(client) => client,
            Err(e) => {
                eprintln!("Skipping DB test, could not connect to database server: {e}");
                return Ok(None);
            }
        };
        let db_name = format!("project_tracker_test_{}", rand::random::<u64>());
        controller.execute(&*format!("create database {db_name}"), &[]).await
            .context("failed to create temporary test DB")?;

        let pool = create_pool(&DbConfig { database: db_name.clone(), ..config.db }).await?;
        let mut client = pool.get().await?;
        migrate(&mut client).await
            .context("failed to run migrations on test DB")?;
        drop(client);

        let store = Store::Db(get_conn(&pool).await?);
        Ok(Some(Self {
            store: Some(store),
            pool,
            controller,
            db_name,
        }))
    }

    pub(super) fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Returns the textual value of the `status` column of the given project,
    /// as stored in the DB.
    pub(super) async fn raw_status(&self, key: Key) -> Result<String> {
        let Store::Db(db) = &**self else {
            unreachable!("test DB is always backed by Postgres");
        };
        let row = db.query_one("select status::text from projects where id = $1", &[&key]).await?;
        Ok(row.get(0))
    }
}

impl Deref for TestDb {
    type Target = Store;
    fn deref(&self) -> &Self::Target {
        self.store.as_ref().unwrap()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Return the connection and close the pool before dropping the DB.
        self.store = None;
        self.pool.close();

        let query = format!("drop database {} with (force)", self.db_name);
        let res = futures::executor::block_on(self.controller.execute(&*query, &[]));
        if let Err(e) = res {
            eprintln!("failed to drop test database '{}': {e}", self.db_name);
        }
    }
}
