use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// The terminal belongs to the TUI; events are dropped.
    Off,
    Stderr,
    File(PathBuf),
}

pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level).map_err(|_| eyre!("invalid log level `{level}`"))
}

/// Installs the global subscriber. Audit events arrive with target `audit`.
pub fn init(sink: &LogSink, level: &str, json: bool) -> Result<()> {
    let level = parse_level(level)?;
    match sink {
        LogSink::Off => Ok(()),
        LogSink::Stderr => install(std::io::stderr, level, json, true),
        LogSink::File(path) => {
            ensure_parent_dir(path)?;
            let file = File::options().create(true).append(true).open(path)?;
            install(Mutex::new(file), level, json, false)
        }
    }
}

fn install<W>(writer: W, level: Level, json: bool, ansi: bool) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_ansi(ansi)
        .with_max_level(level)
        .with_target(true)
        .with_writer(writer);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
