//! A subcommand making sure the configuration can be loaded and the database
//! is reachable. Useful before (re)starting the server.

use crate::{
    args::Shared,
    config::Config,
    db,
    prelude::*,
};


pub(crate) async fn run(shared: &Shared, color: termcolor::ColorChoice) -> Result<()> {
    let config = crate::load_config_and_init_logger(shared, color, "check")
        .context("failed to load config: cannot proceed with `check` command")?;

    info!("Starting to verify various things...");
    let db = check_db(&config).await;
    info!("Done verifying various things");

    // Print summary after all log output
    let mut any_errors = false;
    println!();
    bunt::println!("{$bold+blue+intense}Summary{/$}");
    println!();
    print_outcome(&mut any_errors, "Load configuration", &Ok(()));
    print_outcome(&mut any_errors, "Connection to DB", &db);

    println!();
    if any_errors {
        bunt::println!("{$red+intense}➡  Errors have occurred!{/$}");
        std::process::exit(1);
    } else {
        bunt::println!("{$green+intense}⮕  Everything OK{/$}");
        Ok(())
    }
}

/// Connects to the DB and reports whether migrations are missing.
async fn check_db(config: &Config) -> Result<()> {
    let pool = db::create_pool(&config.db).await?;
    let conn = pool.get().await?;
    let missing = db::unapplied_migrations(&**conn).await?;
    if missing > 0 {
        warn!("{missing} DB migrations are not applied yet (they will be on `serve`)");
    }
    Ok(())
}

fn print_outcome<T>(any_errors: &mut bool, label: &str, result: &Result<T>) {
    match result {
        Ok(_) => {
            bunt::println!(" ▸ {[bold+intense]}  {$green+bold}✔ ok{/$}", label);
        }
        Err(e) => {
            *any_errors = true;
            bunt::println!(" ▸ {[bold+intense]}  {$red+bold}✘ error{/$}", label);
            bunt::println!("      {$red}▶▶▶ {$bold}Error:{/$}{/$} {[yellow+intense]}", e);
            println!();
            bunt::println!("      {$red+italic}Caused by:{/$}");

            for (i, cause) in e.chain().skip(1).enumerate() {
                print!("       {: >1$}", "", i * 2);
                println!("‣ {cause}");
            }
            println!();
        }
    }
}
