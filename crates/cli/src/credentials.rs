//! Login credentials: flag > env > error.

use fleetsync_client::LoginCredentials;

use crate::exit_codes;
use crate::CliError;

pub const ENV_USERNAME: &str = "FLEETSYNC_USERNAME";
pub const ENV_PASSWORD: &str = "FLEETSYNC_PASSWORD";
pub const ENV_CLIENT_AUTH: &str = "FLEETSYNC_CLIENT_AUTH";

/// Credential flags as given on the command line.
#[derive(Default, clap::Args)]
pub struct CredentialArgs {
    /// API username (or set FLEETSYNC_USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// API password (or set FLEETSYNC_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Basic client credential for the login endpoint (or set FLEETSYNC_CLIENT_AUTH)
    #[arg(long)]
    pub client_auth: Option<String>,
}

pub fn resolve(args: &CredentialArgs) -> Result<LoginCredentials, CliError> {
    Ok(LoginCredentials {
        username: resolve_secret(args.username.clone(), "username", "--username", ENV_USERNAME)?,
        password: resolve_secret(args.password.clone(), "password", "--password", ENV_PASSWORD)?,
        client_auth: resolve_secret(
            args.client_auth.clone(),
            "client credential",
            "--client-auth",
            ENV_CLIENT_AUTH,
        )?,
    })
}

fn resolve_secret(
    flag: Option<String>,
    what: &str,
    flag_name: &str,
    env_var: &str,
) -> Result<String, CliError> {
    let missing = || CliError {
        code: exit_codes::EXIT_API_NOT_AUTH,
        message: format!("missing API {} (use {} or set {})", what, flag_name, env_var),
        hint: Some("pass --no-enrich together with --remote-file to run offline".into()),
    };

    if let Some(value) = flag {
        let trimmed = value.trim().to_string();
        if trimmed.is_empty() {
            return Err(missing());
        }
        return Ok(trimmed);
    }

    if let Ok(value) = std::env::var(env_var) {
        let trimmed = value.trim().to_string();
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
    }

    Err(missing())
}
