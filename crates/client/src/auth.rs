//! Password login. The bearer token lives only in memory for one run.

use std::fmt;

use serde::Serialize;

use crate::client::{classify_status, ClientError};

/// Login credentials. `client_auth` is the API client's Basic credential,
/// with or without the `Basic ` prefix.
#[derive(Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
    pub client_auth: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_auth", &"<redacted>")
            .finish()
    }
}

impl LoginCredentials {
    fn basic_header(&self) -> String {
        let raw = self.client_auth.trim();
        let raw = raw.strip_prefix("Basic ").unwrap_or(raw);
        format!("Basic {}", raw.trim())
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// Exchange credentials for a bearer token.
///
/// The token is read from `oauth.access_token` in the response body.
pub fn request_token(
    http: &reqwest::blocking::Client,
    login_url: &str,
    creds: &LoginCredentials,
) -> Result<String, ClientError> {
    log::info!("logging in as '{}'", creds.username);

    let response = http
        .post(login_url)
        .header(reqwest::header::AUTHORIZATION, creds.basic_header())
        .json(&LoginBody {
            username: &creds.username,
            password: &creds.password,
        })
        .send()
        .map_err(|e| ClientError::Network(e.to_string()))?;

    let response = classify_status(response)?;
    let json: serde_json::Value = response
        .json()
        .map_err(|e| ClientError::Parse(e.to_string()))?;

    json["oauth"]["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .map(String::from)
        .ok_or_else(|| ClientError::Parse("Missing oauth.access_token in login response".into()))
}
