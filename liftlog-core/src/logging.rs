use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use log::LevelFilter;

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Appended to; used while the terminal UI owns the screen.
    File(PathBuf),
    Silent,
}

pub fn init_logger(level: LevelFilter, sink: LogSink) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.format(move |buf, record| {
        writeln!(
            buf,
            "{}: {} - {}",
            record.level(),
            record.target(),
            record.args()
        )
    });

    let level = match sink {
        LogSink::Stderr => {
            builder.target(env_logger::Target::Stderr);
            level
        }
        LogSink::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            level
        }
        LogSink::Silent => LevelFilter::Off,
    };
    builder.filter_level(level);

    let _ = builder.try_init();

    log::set_max_level(level);
    Ok(())
}

pub fn parse_level(level: &str) -> Option<LevelFilter> {
    let lvl = match level.trim().to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => return None,
    };
    Some(lvl)
}
