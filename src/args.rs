//! This module defines the command line arguments we accept.

use std::path::PathBuf;
use termcolor::ColorChoice;

use crate::{cmd, db::cmd::DbCommand};


#[derive(Debug, clap::Parser)]
#[clap(about = "GraphQL API to manage clients and their projects.")]
pub(crate) struct Args {
    #[clap(subcommand)]
    pub(crate) cmd: Command,

    /// Whether to use colors in the output.
    #[clap(long, global = true, value_enum, default_value_t = ColorArg::Auto)]
    color: ColorArg,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Command {
    /// Starts the HTTP server serving the GraphQL API.
    Serve {
        /// Serves a fixed set of sample clients and projects from memory
        /// instead of the database. The API is read-only in that case and no
        /// database connection is made.
        #[clap(long)]
        sample_data: bool,

        #[clap(flatten)]
        shared: Shared,
    },

    /// Database operations.
    Db {
        #[clap(subcommand)]
        cmd: DbCommand,

        #[clap(flatten)]
        shared: Shared,
    },

    /// Checks the configuration and the database connection.
    ///
    /// Exits with 0 if everything is Ok, and with 1 otherwise.
    Check {
        #[clap(flatten)]
        shared: Shared,
    },

    /// Outputs a template for the configuration file (which includes
    /// descriptions of all options).
    WriteConfig {
        /// Target file. If not specified, the template is written to stdout.
        target: Option<PathBuf>,
    },

    /// Exports the API as GraphQL schema.
    ExportApiSchema {
        #[clap(flatten)]
        args: cmd::export_api_schema::Args,
    },
}

#[derive(Debug, clap::Args)]
pub(crate) struct Shared {
    /// Path to the configuration file. If this is not specified, we check
    /// `PROJECT_TRACKER_CONFIG_PATH` and then try opening `config.toml` or
    /// `/etc/project-tracker/config.toml`.
    #[clap(short, long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ColorArg {
    Auto,
    Always,
    Never,
}

impl Args {
    /// Color choice for stdout. `Auto` only uses colors if stdout is a
    /// terminal.
    pub(crate) fn stdout_color(&self) -> ColorChoice {
        self.color_choice(std::io::stdout())
    }

    /// Like [`Self::stdout_color`], but for stderr.
    pub(crate) fn stderr_color(&self) -> ColorChoice {
        self.color_choice(std::io::stderr())
    }

    fn color_choice(&self, stream: impl std::io::IsTerminal) -> ColorChoice {
        match self.color {
            ColorArg::Always => ColorChoice::Always,
            ColorArg::Never => ColorChoice::Never,
            ColorArg::Auto if stream.is_terminal() => ColorChoice::Auto,
            ColorArg::Auto => ColorChoice::Never,
        }
    }
}
