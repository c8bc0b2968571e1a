//! env_logger setup: `RUST_LOG` first, then `-v`/`-q`, optionally to a file.

use std::fs::OpenOptions;
use std::path::Path;

use env_logger::{Builder, Env, Target, WriteStyle};
use log::LevelFilter;

use crate::CliError;

fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

pub fn init(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<(), CliError> {
    let default = level_for(verbose, quiet);
    let mut builder = Builder::from_env(Env::default().default_filter_or(default.as_str()));
    if verbose > 0 || quiet {
        builder.filter_level(default);
    }

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::write(format!("cannot create {}: {e}", parent.display())))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CliError::write(format!("cannot open log file {}: {e}", path.display())))?;
        builder.target(Target::Pipe(Box::new(file))).write_style(WriteStyle::Never);
    }

    builder
        .try_init()
        .map_err(|e| CliError::general(format!("cannot initialize logging: {e}")))
}
