use std::{
    collections::HashMap,
    fmt::Write as _,
    fs::OpenOptions,
    io::Write as _,
    path::{Path, PathBuf},
};
use nu_ansi_term::{Color, Style};
use serde::Deserialize;
use termcolor::ColorChoice;
use tracing::{field::{Field, Visit}, Level};
use tracing_log::NormalizeEvent;
use tracing_subscriber::{
    filter::{FilterFn, LevelFilter},
    fmt::FormatEvent,
    prelude::*,
};

use crate::prelude::*;


#[derive(Debug, confique::Config)]
pub(crate) struct LogConfig {
    /// Specifies what log messages to emit, based on the module path and log level.
    ///
    /// This is a map where the key specifies a module path prefix, and the
    /// value specifies a minimum log level. For each log message, the map
    /// entry with the longest prefix matching the log's module path is chosen.
    /// If no such entry exists, the log is not emitted. Otherwise, that
    /// entry's level is used to check whether the log message should be
    /// emitted.
    ///
    /// Example: allow ≥"info" logs generally, ≥"trace" for the `db` module,
    /// but no logs at all from the DB connection wrapper. Additionally,
    /// ≥"debug" messages from the HTTP library `hyper`:
    ///
    ///    [log]
    ///    filters.project_tracker = "info"
    ///    filters."project_tracker::db" = "trace"
    ///    filters."project_tracker::db::conn" = "off"
    ///    filters.hyper = "debug"
    #[config(default = { "project_tracker": "debug" })]
    pub(crate) filters: Filters,

    /// If this is set, log messages are also written to this file. The string
    /// `${cmd}` in this value is replaced by the subcommand name, e.g. `serve`
    /// or `db`. Example: "/var/log/project-tracker-${cmd}.log".
    pub(crate) file: Option<PathBuf>,

    /// If this is set to `false`, log messages are not written to stdout.
    #[config(default = true)]
    pub(crate) stdout: bool,

    /// If set to `true`, HTTP header of each incoming request are logged
    /// (with 'trace' level).
    #[config(default = false)]
    pub(crate) log_http_headers: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "HashMap<String, String>")]
pub(crate) struct Filters(HashMap<String, LevelFilter>);

impl TryFrom<HashMap<String, String>> for Filters {
    type Error = String;
    fn try_from(value: HashMap<String, String>) -> Result<Self, Self::Error> {
        value.into_iter()
            .map(|(target_prefix, level)| Ok((target_prefix, parse_level_filter(&level)?)))
            .collect::<Result<_, String>>()
            .map(Self)
    }
}

impl Filters {
    /// Returns the level filter of the longest matching prefix, or `None` if
    /// no prefix matches `target`.
    fn level_for(&self, target: &str) -> Option<LevelFilter> {
        self.0.iter()
            .filter(|(prefix, _)| target.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, level)| *level)
    }

    fn allows(&self, target: &str, level: &Level) -> bool {
        self.level_for(target).is_some_and(|filter| level <= &filter)
    }

    fn max_level(&self) -> LevelFilter {
        self.0.values().max().copied().unwrap_or(LevelFilter::OFF)
    }
}

fn parse_level_filter(s: &str) -> Result<LevelFilter, String> {
    match s {
        "off" => Ok(LevelFilter::OFF),
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        other => Err(format!("invalid log level '{other}'")),
    }
}

/// Installs our own logger globally. Must only be called once!
pub(crate) fn init(config: &LogConfig, color: ColorChoice, cmd: &str) -> Result<()> {
    let filter = {
        let filters = config.filters.clone();
        let max_level = filters.max_level();
        FilterFn::new(move |metadata| filters.allows(metadata.target(), metadata.level()))
            .with_max_level_hint(max_level)
    };

    let stdout_output = config.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(EventFormatter(color))
            .with_writer(std::io::stdout)
    });

    let file_output = config.file.as_deref()
        .map(|path| open_log_file(path, cmd))
        .transpose()?
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .event_format(EventFormatter(color))
                .with_writer(file)
                .with_ansi(color == ColorChoice::Always)
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_output)
        .with(stdout_output)
        .init();

    Ok(())
}

fn open_log_file(path: &Path, cmd: &str) -> Result<std::fs::File> {
    let path = path.to_str()
        .ok_or_else(|| anyhow!("log file path is not valid UTF-8"))?
        .replace("${cmd}", cmd);

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .with_context(|| format!("failed to open/create log file '{path}'"))?;

    // Empty line to make process restarts easier to spot.
    file.write_all(b"\n").context("could not write to log file")?;

    Ok(file)
}


type TracingWriter<'a> = tracing_subscriber::fmt::format::Writer<'a>;

/// Prints one line per event: time, level, target, message and then all
/// other fields as `key=value`.
#[derive(Clone, Copy)]
struct EventFormatter(ColorChoice);

impl<S, N> FormatEvent<S, N> for EventFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: TracingWriter<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let use_ansi = self.0 == ColorChoice::Always
            || (writer.has_ansi_escapes() && self.0 != ColorChoice::Never);
        let paint = |style: Style, s: &str| -> String {
            if use_ansi { style.paint(s).to_string() } else { s.to_owned() }
        };

        // Events from the `log` crate carry their real metadata in fields.
        let normalized_metadata = event.normalized_metadata();
        let metadata = normalized_metadata.as_ref().unwrap_or(event.metadata());
        let styles = LevelStyles::new(*metadata.level());
        let dim = Style::new().dimmed();

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S.%3f").to_string();
        write!(writer, "{} ", paint(dim, &time))?;
        write!(writer, "{}", paint(styles.level, &format!("{:5}", metadata.level())))?;
        write!(writer, "{}", paint(dim, &format!(" {} >  ", metadata.target())))?;

        // Continuation lines of multi-line messages are indented to align
        // with the first line.
        let indent = format!(
            "\n{:width$}{}",
            "",
            paint(dim, ">  "),
            width = time.len() + 1 + 5 + 1 + metadata.target().len() + 1,
        );
        let message = fields.message.unwrap_or_default();
        write!(writer, "{}", paint(styles.body, &message.replace('\n', &indent)))?;

        if !fields.others.is_empty() {
            if !message.is_empty() {
                write!(writer, "{}", paint(styles.level, " ~~"))?;
            }
            for (name, value) in &fields.others {
                write!(writer, " {}", paint(styles.body.italic(), name))?;
                write!(writer, "{}", paint(styles.body, &format!("={value}")))?;
            }
        }

        writeln!(writer)
    }
}

struct LevelStyles {
    level: Style,
    body: Style,
}

impl LevelStyles {
    fn new(level: Level) -> Self {
        match level {
            Level::ERROR => Self {
                level: Style::new().fg(Color::Red).bold(),
                body: Style::new().fg(Color::Red),
            },
            Level::WARN => Self {
                level: Style::new().fg(Color::Yellow).bold(),
                body: Style::new().fg(Color::Yellow),
            },
            Level::INFO => Self {
                level: Style::new().fg(Color::Green),
                body: Style::new(),
            },
            Level::DEBUG => Self {
                level: Style::new().fg(Color::Blue),
                body: Style::new().dimmed(),
            },
            Level::TRACE => Self {
                level: Style::new().fg(Color::Magenta),
                body: Style::new().fg(Color::DarkGray),
            },
        }
    }
}

/// Collects the message and all other fields of an event. Fields added by
/// `tracing-log` are skipped.
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    others: Vec<(&'static str, String)>,
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let name = field.name();
        if name.starts_with("log.") {
            return;
        }

        let mut s = String::new();
        let _ = write!(s, "{value:?}");
        if name == "message" {
            self.message = Some(s);
        } else {
            self.others.push((name, s));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else if !field.name().starts_with("log.") {
            self.others.push((field.name(), value.to_owned()));
        }
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use tracing::{Level, level_filters::LevelFilter};
    use super::{Filters, parse_level_filter};

    fn filters(entries: &[(&str, &str)]) -> Filters {
        let map = entries.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Filters::try_from(map).unwrap()
    }

    #[test]
    fn level_names() {
        assert_eq!(parse_level_filter("off"), Ok(LevelFilter::OFF));
        assert_eq!(parse_level_filter("debug"), Ok(LevelFilter::DEBUG));
        assert_eq!(parse_level_filter("error"), Ok(LevelFilter::ERROR));
        assert!(parse_level_filter("verbose").is_err());
        assert!(parse_level_filter("INFO").is_err());
    }

    #[test]
    fn longest_prefix_wins() {
        let f = filters(&[
            ("project_tracker", "info"),
            ("project_tracker::db", "trace"),
            ("project_tracker::db::conn", "off"),
        ]);

        assert!(f.allows("project_tracker::api", &Level::INFO));
        assert!(!f.allows("project_tracker::api", &Level::DEBUG));
        assert!(f.allows("project_tracker::db::migrations", &Level::TRACE));
        assert!(!f.allows("project_tracker::db::conn", &Level::ERROR));
        assert!(!f.allows("hyper::proto", &Level::ERROR));
        assert_eq!(f.max_level(), LevelFilter::TRACE);
    }

    #[test]
    fn invalid_filter_level() {
        let map = HashMap::from([("project_tracker".to_owned(), "loud".to_owned())]);
        assert!(Filters::try_from(map).is_err());
    }
}
