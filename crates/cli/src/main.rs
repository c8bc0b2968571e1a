// fleetsync CLI - vehicle record reconciliation

mod config;
mod credentials;
mod exit_codes;
mod logging;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_INPUT, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};

#[derive(Parser)]
#[command(name = "fleetsync")]
#[command(about = "Merge the vehicle API with a local vehicle list, keep inspected vehicles, resolve label colors")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch vehicles, merge with a local file, filter, enrich and export
    #[command(after_help = "\
Examples:
  fleetsync run vehicles.csv
  fleetsync run vehicles.csv -k labelIds -k info -o fleet.xlsx
  fleetsync run vehicles.csv --json result.json
  fleetsync run vehicles.csv --remote-file active.json --no-enrich -o fleet.csv")]
    Run {
        /// Local vehicle file (CSV, JSON or Excel)
        local: PathBuf,

        /// Config file (default: ./fleetsync.toml, then the user config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Delimiter of a CSV local file (default: sniffed)
        #[arg(long)]
        delimiter: Option<char>,

        /// Extra columns to export. Repeatable; comma-separated accepted.
        #[arg(long, short = 'k', value_delimiter = ',')]
        keys: Vec<String>,

        /// Output file; format from extension (default: vehicles_<date>.xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also write the full result (meta, summary, records) as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Read remote vehicles from a JSON file instead of the API
        #[arg(long)]
        remote_file: Option<PathBuf>,

        /// Skip label color lookups
        #[arg(long)]
        no_enrich: bool,

        #[command(flatten)]
        credentials: credentials::CredentialArgs,

        /// Suppress the stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Merge a remote JSON export with a local file offline (no enrichment)
    #[command(after_help = "\
Examples:
  fleetsync merge active.json vehicles.csv
  fleetsync merge active.json vehicles.csv --json > result.json
  fleetsync merge active.json vehicles.csv -o merged.xlsx")]
    Merge {
        /// Remote vehicles (JSON array of objects)
        remote: PathBuf,

        /// Local vehicle file (CSV, JSON or Excel)
        local: PathBuf,

        /// Config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Delimiter of a CSV local file (default: sniffed)
        #[arg(long)]
        delimiter: Option<char>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write merged records to file; format from extension
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate a config file without running
    Validate {
        /// Config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  fleetsync-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Run { quiet: true, .. });
    let result = logging::init(cli.verbose, quiet, cli.log_file.as_deref()).and_then(|()| {
        match cli.command {
            Commands::Run {
                local,
                config,
                delimiter,
                keys,
                output,
                json,
                remote_file,
                no_enrich,
                credentials,
                quiet,
            } => run::cmd_run(run::RunOptions {
                local,
                config,
                delimiter,
                keys,
                output,
                json,
                remote_file,
                no_enrich,
                quiet,
                credentials,
            }),
            Commands::Merge { remote, local, config, delimiter, json, output } => {
                run::cmd_merge(remote, local, config, delimiter, json, output)
            }
            Commands::Validate { config } => config::cmd_validate(config),
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_WRITE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
