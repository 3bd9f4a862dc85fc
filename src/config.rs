use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use confique::Config as _;

use crate::prelude::*;


/// The locations where we look for a configuration file. The first existing
/// file in this list is used.
const DEFAULT_PATHS: &[&str] = &[
    // Only for development.
    #[cfg(debug_assertions)]
    "util/dev-config/config.toml",

    "config.toml",
    "/etc/project-tracker/config.toml",
];

const CONFIG_PATH_ENV: &str = "PROJECT_TRACKER_CONFIG_PATH";

/// Configuration for the project tracker.
///
/// All relative paths are relative to the location of this configuration file.
#[derive(Debug, confique::Config)]
pub(crate) struct Config {
    #[config(nested)]
    pub(crate) db: crate::db::DbConfig,

    #[config(nested)]
    pub(crate) http: crate::http::HttpConfig,

    #[config(nested)]
    pub(crate) log: crate::logger::LogConfig,
}

impl Config {
    /// Loads the configuration from `explicit_path` if given. Otherwise,
    /// checks `PROJECT_TRACKER_CONFIG_PATH` and then the default locations.
    /// Returns the loaded config and the path that it was loaded from.
    pub(crate) fn load(explicit_path: Option<&Path>) -> Result<(Self, PathBuf)> {
        let path = match explicit_path {
            Some(path) => path.to_owned(),
            None => find_config_file()?,
        };

        let config = Self::load_from(&path)
            .with_context(|| format!("failed to load configuration from '{}'", path.display()))?;

        Ok((config, path))
    }

    /// Loads the configuration from a specific TOML file.
    pub(crate) fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Config::from_file(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;

        config.fix_paths(path)?;

        Ok(config)
    }

    /// Changes all relative paths in the configuration to be absolute, based
    /// on the path of the configuration file itself.
    fn fix_paths(&mut self, config_path: &Path) -> Result<()> {
        let absolute_config_path = config_path.canonicalize()
            .context("failed to canonicalize config path")?;
        let base = absolute_config_path.parent()
            .ok_or_else(|| anyhow!("config file path has no parent"))?;

        if let Some(p) = &mut self.log.file {
            fix_path(base, p);
        }

        Ok(())
    }
}

fn find_config_file() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    DEFAULT_PATHS.iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| anyhow!(
            "no configuration file found. Note: we checked the following paths: {}",
            DEFAULT_PATHS.join(", "),
        ))
}

fn fix_path(base_path: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base_path.join(&path);
    }
}

/// Writes the generated TOML config template file to the given destination or
/// stdout.
pub(crate) fn write_template(path: Option<&Path>) -> Result<()> {
    info!(
        "Writing configuration template to '{}'",
        path.map(|p| p.display().to_string()).unwrap_or("<stdout>".into()),
    );

    let template = template();
    match path {
        Some(path) => fs::write(path, template)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => io::stdout().write_all(template.as_bytes())?,
    }

    Ok(())
}

fn template() -> String {
    let mut options = confique::toml::FormatOptions::default();
    options.general.nested_field_gap = 2;
    confique::toml::template::<Config>(options)
}
