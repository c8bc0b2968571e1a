//! `fleetsync run` and `fleetsync merge`: load both inputs, run the
//! pipeline, write the results.

use std::path::{Path, PathBuf};

use fleetsync_client::ApiClient;
use fleetsync_io::export::{write_records, ExportFormat};
use fleetsync_recon::{LabelLookup, PipelineOutput, RecordSet};

use crate::config::AppConfig;
use crate::credentials::{self, CredentialArgs};
use crate::exit_codes::{client_exit_code, recon_exit_code};
use crate::CliError;

/// Options for `fleetsync run`.
#[derive(Default)]
pub struct RunOptions {
    pub local: PathBuf,
    pub config: Option<PathBuf>,
    pub delimiter: Option<char>,
    pub keys: Vec<String>,
    pub output: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub remote_file: Option<PathBuf>,
    pub no_enrich: bool,
    pub quiet: bool,
    pub credentials: CredentialArgs,
}

pub fn cmd_run(opts: RunOptions) -> Result<(), CliError> {
    let config = AppConfig::load(opts.config.as_deref())?;

    let output_path = opts.output.clone().unwrap_or_else(|| {
        let today = chrono::Local::now().date_naive();
        PathBuf::from(config.export.file_name(today, "xlsx"))
    });
    // Reject a bad extension before any network traffic
    ExportFormat::from_path(&output_path).map_err(CliError::args)?;

    let local = load_local(&opts.local, opts.delimiter)?;

    let needs_api = opts.remote_file.is_none() || !opts.no_enrich;
    let client = if needs_api {
        Some(connect(&config, &opts.credentials)?)
    } else {
        None
    };

    let remote = match (&opts.remote_file, &client) {
        (Some(path), _) => load_remote(path)?,
        (None, Some(client)) => client.fetch_vehicles().map_err(CliError::client)?,
        (None, None) => return Err(CliError::args("no vehicle source: give --remote-file or API credentials")),
    };

    let lookup: Option<&dyn LabelLookup> = if opts.no_enrich {
        None
    } else {
        client.as_ref().map(|c| c as &dyn LabelLookup)
    };

    let output = fleetsync_recon::run(&config.recon, &remote, &local, lookup)
        .map_err(CliError::recon)?;

    if let Some(ref path) = opts.json {
        write_json(&output, path)?;
        if !opts.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    let rows = write_records(&output.records, &output_path, &config.export, &opts.keys)
        .map_err(|e| CliError::write(format!("cannot write {}: {e}", output_path.display())))?;

    if !opts.quiet {
        print_summary(&output);
        eprintln!("wrote {} row(s) to {}", rows, output_path.display());
    }
    Ok(())
}

/// `fleetsync merge`: offline merge and filter, no enrichment.
pub fn cmd_merge(
    remote_path: PathBuf,
    local_path: PathBuf,
    config_path: Option<PathBuf>,
    delimiter: Option<char>,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = AppConfig::load(config_path.as_deref())?;
    if let Some(ref path) = output_file {
        ExportFormat::from_path(path).map_err(CliError::args)?;
    }

    let remote = load_remote(&remote_path)?;
    let local = load_local(&local_path, delimiter)?;

    let output = fleetsync_recon::run(&config.recon, &remote, &local, None)
        .map_err(CliError::recon)?;

    if let Some(ref path) = output_file {
        let rows = write_records(&output.records, path, &config.export, &[])
            .map_err(|e| CliError::write(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {} row(s) to {}", rows, path.display());
    }

    if json_output {
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    print_summary(&output);
    Ok(())
}

fn connect(config: &AppConfig, args: &CredentialArgs) -> Result<ApiClient, CliError> {
    let creds = credentials::resolve(args)?;
    let mut client = ApiClient::new(config.api.clone()).map_err(CliError::client)?;
    client.login(&creds).map_err(CliError::client)?;
    Ok(client)
}

/// Local vehicle file: CSV, JSON or Excel by extension. A CSV delimiter is
/// sniffed unless given.
fn load_local(path: &Path, delimiter: Option<char>) -> Result<RecordSet, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let result = match ext.as_str() {
        "json" => fleetsync_io::json::import(path),
        "xlsx" | "xls" | "xlsb" | "ods" => fleetsync_io::xlsx::import(path),
        _ => match delimiter {
            Some(d) if !d.is_ascii() => {
                return Err(CliError::args(format!("delimiter must be a single ASCII character, got '{d}'")));
            }
            Some(d) => fleetsync_io::csv::import_with_delimiter(path, d as u8),
            None => fleetsync_io::csv::import(path),
        },
    };
    result.map_err(|e| CliError::io(format!("cannot load {}: {e}", path.display())))
}

fn load_remote(path: &Path) -> Result<RecordSet, CliError> {
    fleetsync_io::json::import(path).map_err(|e| {
        CliError::io(format!("cannot load {}: {e}", path.display()))
            .with_hint("remote vehicles must be a JSON array of objects, as the API returns them")
    })
}

fn write_json(output: &PipelineOutput, path: &Path) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(output)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    std::fs::write(path, json_str)
        .map_err(|e| CliError::write(format!("cannot write {}: {e}", path.display())))
}

/// Human summary to stderr.
fn print_summary(output: &PipelineOutput) {
    let s = &output.summary;
    eprintln!(
        "merged {} row(s) on '{}': {} matched, {} remote only, {} local only, {} without key",
        s.merged_rows, output.meta.key_field, s.matched, s.left_only, s.right_only, s.unkeyed,
    );
    eprintln!(
        "dropped {} row(s) without '{}', {} remaining",
        s.dropped_missing_required, output.meta.required_field, s.output_rows,
    );
    let conflicts = s.unresolved_conflicts();
    if conflicts > 0 {
        eprintln!("{} field conflict(s) kept both values", conflicts);
    }
    if let Some(ref e) = s.enrichment {
        eprintln!(
            "labels: {} looked up, {} resolved, {} failed, {} without label",
            e.attempted, e.resolved, e.failed, e.skipped,
        );
    }
}

impl CliError {
    fn recon(err: fleetsync_recon::ReconError) -> Self {
        let hint = match &err {
            fleetsync_recon::ReconError::MissingKeyField { .. } => {
                Some("set [merge] key_field in fleetsync.toml".to_string())
            }
            fleetsync_recon::ReconError::DuplicateKey { .. } => {
                Some("each key value may appear only once per input".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    fn client(err: fleetsync_client::ClientError) -> Self {
        let hint = match &err {
            fleetsync_client::ClientError::Auth(..) => {
                Some("check FLEETSYNC_USERNAME, FLEETSYNC_PASSWORD and FLEETSYNC_CLIENT_AUTH".to_string())
            }
            fleetsync_client::ClientError::Network(_) => {
                Some("check [api] base_url and connectivity".to_string())
            }
            _ => None,
        };
        Self { code: client_exit_code(&err), message: err.to_string(), hint }
    }
}
