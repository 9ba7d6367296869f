//! Logger setup for `--quiet`, `--verbose` and `--logfile`.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::LevelFilter;

use crate::CliError;

/// Writes to stderr and to a log file, with colour codes removed from the
/// file copy.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(&strip_ansi_escapes::strip(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

pub(crate) fn level_for(quiet: bool, verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}

/// Install the global logger. `RUST_LOG` overrides the chosen level.
pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(quiet, verbose))
        .filter_module("hyper_util", LevelFilter::Warn)
        .filter_module("rustls", LevelFilter::Warn)
        .parse_default_env();

    if verbose {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }

    if let Some(path) = logfile {
        let file = File::create(path).map_err(|e| {
            CliError::config(format!("Cannot create log file {}: {}", path.display(), e))
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
    }

    builder
        .try_init()
        .map_err(|e| CliError::config(format!("Failed to initialise logging: {}", e)))
}
