//! GraphQL API server to manage clients and their projects.

use clap::Parser;
use deadpool_postgres::Pool;
use std::{env, sync::Arc};
use termcolor::ColorChoice;

use crate::{
    args::{Args, Command, Shared},
    config::Config,
    http::Backend,
    prelude::*,
    store::MemoryStore,
};

mod api;
mod args;
mod config;
mod cmd;
mod db;
mod http;
mod logger;
mod model;
mod prelude;
mod store;


#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Log error in case stdout is not connected and it is logged into a file.
        error!("{:?}", e);

        // Show a somewhat nice representation of the error
        eprintln!();
        eprintln!();
        bunt::eprintln!("{$red}▶▶▶ {$bold}Error:{/$}{/$} {[yellow+intense]}", e);
        eprintln!();
        if e.chain().len() > 1 {
            bunt::eprintln!("{$red+italic}Caused by:{/$}");
        }

        for (i, cause) in e.chain().skip(1).enumerate() {
            eprint!(" {: >1$}", "", i * 2);
            eprintln!("‣ {cause}");
        }

        std::process::exit(1);
    }
}

/// Main entry point.
async fn run() -> Result<()> {
    // Backtraces are almost always useful, so they are on unless the user
    // decided otherwise.
    if env::var_os("RUST_BACKTRACE").is_none() {
        env::set_var("RUST_BACKTRACE", "1");
    }

    let args = Args::parse();

    // Configure output via `bunt`
    bunt::set_stdout_color_choice(args.stdout_color());
    bunt::set_stderr_color_choice(args.stderr_color());
    let color = args.stdout_color();

    match &args.cmd {
        Command::Serve { sample_data, shared } => {
            let config = load_config_and_init_logger(shared, color, "serve")?;
            start_server(config, *sample_data).await?;
        }
        Command::Db { cmd, shared } => {
            let config = load_config_and_init_logger(shared, color, "db")?;
            db::cmd::run(cmd, &config).await?;
        }
        Command::Check { shared } => cmd::check::run(shared, color).await?,
        Command::WriteConfig { target } => config::write_template(target.as_deref())?,
        Command::ExportApiSchema { args } => cmd::export_api_schema::run(args)?,
    }

    Ok(())
}

async fn start_server(config: Config, sample_data: bool) -> Result<()> {
    info!("Starting project tracker ...");
    trace!("Configuration: {:#?}", config);

    let (schema, backend) = if sample_data {
        info!("Serving built-in sample data (read-only API, no database)");
        let store = Arc::new(MemoryStore::with_sample_data());
        (api::Schema::ReadOnly(api::read_only_root_node()), Backend::Sample(store))
    } else {
        let pool = connect_and_migrate_db(&config).await?;
        (api::Schema::Full(api::root_node()), Backend::Postgres(pool))
    };

    http::serve(config, schema, backend).await
        .context("failed to start HTTP server")?;

    Ok(())
}

/// Loads the configuration (see [`Config::load`]) and installs the logger.
fn load_config_and_init_logger(
    shared: &Shared,
    color: ColorChoice,
    cmd: &str,
) -> Result<Config> {
    let (config, path) = Config::load(shared.config.as_deref())?;

    // The logger can only be initialized after reading the config.
    logger::init(&config.log, color, cmd)?;
    info!("Loaded config from '{}'", path.display());

    Ok(config)
}

async fn connect_and_migrate_db(config: &Config) -> Result<Pool> {
    let db = db::create_pool(&config.db).await
        .context("failed to create database connection pool (database not running?)")?;
    db::migrate(&mut *db.get().await?).await
        .context("failed to check/run DB migrations")?;
    Ok(db)
}
