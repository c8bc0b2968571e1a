//! Vehicle API HTTP client.

use serde_json::Value;

use fleetsync_recon::model::{Record, RecordSet};
use fleetsync_recon::pipeline::{LabelLookup, LookupError};

use crate::auth::{request_token, LoginCredentials};
use crate::config::ApiConfig;

const USER_AGENT: &str = concat!("fleetsync/", env!("CARGO_PKG_VERSION"));

/// Vehicle API client (blocking).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    config: ApiConfig,
    token: Option<String>,
}

/// Error type for API operations.
#[derive(Debug)]
pub enum ClientError {
    /// No bearer token yet
    NotAuthenticated,
    /// Login or request rejected (401/403)
    Auth(u16, String),
    /// Any other non-success status
    Http(u16, String),
    /// Transport failure
    Network(String),
    /// Body is not the JSON we expected
    Parse(String),
    /// JSON parsed but has the wrong shape
    Payload(String),
    /// Invalid `[api]` settings
    Config(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotAuthenticated => write!(f, "Not authenticated, log in first"),
            ClientError::Auth(code, msg) => write!(f, "Authentication failed ({}): {}", code, msg),
            ClientError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClientError::Payload(msg) => write!(f, "Unexpected payload: {}", msg),
            ClientError::Config(msg) => write!(f, "Invalid API config: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl ApiClient {
    /// Create an unauthenticated client.
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config, token: None })
    }

    /// Use an already-issued bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Log in and keep the token for subsequent requests.
    pub fn login(&mut self, creds: &LoginCredentials) -> Result<(), ClientError> {
        let token = request_token(&self.http, &self.config.login_url, creds)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch the active vehicle list as a record set.
    pub fn fetch_vehicles(&self) -> Result<RecordSet, ClientError> {
        let json = self.get(&self.config.vehicles_url())?;
        let set = records_from_payload(json)?;
        log::info!("fetched {} vehicle(s), {} column(s)", set.len(), set.columns.len());
        Ok(set)
    }

    /// Resolve a label id to its color code.
    ///
    /// The endpoint answers with an array; the first element's `colorCode`
    /// is the color.
    pub fn label_color(&self, label_id: &str) -> Result<String, ClientError> {
        let url = self.config.label_url(label_id.trim())?;
        let json = self.get(url.as_str())?;
        let first = json
            .as_array()
            .ok_or_else(|| ClientError::Payload("label response is not an array".into()))?
            .first()
            .ok_or_else(|| ClientError::Payload(format!("no label '{}'", label_id)))?;

        first["colorCode"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ClientError::Payload(format!("label '{}' has no colorCode", label_id)))
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str) -> Result<Value, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        log::debug!("GET {}", url);

        let response = self.http.get(url)
            .bearer_auth(token)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        classify_status(response)?
            .json()
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

impl LabelLookup for ApiClient {
    fn resolve_color(&self, label_id: &str) -> Result<String, LookupError> {
        self.label_color(label_id)
            .map_err(|e| LookupError::new(label_id, e.to_string()))
    }
}

/// Map non-success responses to `Auth` (401/403) or `Http`.
pub(crate) fn classify_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ClientError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    if status == 401 || status == 403 {
        return Err(ClientError::Auth(status, body));
    }
    Err(ClientError::Http(status, body))
}

fn records_from_payload(json: Value) -> Result<RecordSet, ClientError> {
    let Value::Array(items) = json else {
        return Err(ClientError::Payload("vehicle response is not an array".into()));
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(ClientError::Payload(format!("vehicle {}: expected object", idx))),
        })
        .collect::<Result<Vec<Record>, ClientError>>()?;

    Ok(RecordSet::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ApiConfig {
            base_url: server.base_url(),
            login_url: server.url("/login"),
            ..ApiConfig::default()
        };
        ApiClient::new(config).unwrap()
    }

    #[test]
    fn test_requests_need_a_token() {
        let server = MockServer::start();
        let err = client_for(&server).fetch_vehicles().unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[test]
    fn test_fetch_vehicles_sends_bearer() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/vehicles/select/active")
                .header("authorization", "Bearer tok");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([
                    {"rnr": 1001, "kurzname": "LKW-01", "hu": null},
                    {"rnr": 1002, "kurzname": "LKW-02", "labelIds": "76"}
                ]));
        });

        let set = client_for(&server).with_token("tok").fetch_vehicles().unwrap();

        mock.assert();
        assert_eq!(set.columns, vec!["rnr", "kurzname", "hu", "labelIds"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.records[1]["labelIds"], json!("76"));
    }

    #[test]
    fn test_fetch_vehicles_rejects_object_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/vehicles/select/active");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"error": "nope"}));
        });

        let err = client_for(&server).with_token("tok").fetch_vehicles().unwrap_err();
        assert!(matches!(err, ClientError::Payload(_)), "{err}");
    }

    #[test]
    fn test_expired_token_is_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/vehicles/select/active");
            then.status(401).body("token expired");
        });

        let err = client_for(&server).with_token("old").fetch_vehicles().unwrap_err();
        assert!(matches!(err, ClientError::Auth(401, ref body) if body == "token expired"), "{err}");
    }

    #[test]
    fn test_server_error_is_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/vehicles/select/active");
            then.status(503).body("maintenance");
        });

        let err = client_for(&server).with_token("tok").fetch_vehicles().unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503: maintenance");
    }

    #[test]
    fn test_label_color_takes_first_element() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/labels/76");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([
                    {"id": 76, "name": "Werkstatt", "colorCode": "#ff7600"},
                    {"id": 76, "name": "dup", "colorCode": "#000000"}
                ]));
        });

        let color = client_for(&server).with_token("tok").label_color("76").unwrap();
        assert_eq!(color, "#ff7600");
    }

    #[test]
    fn test_label_lookup_failures() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/labels/1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1/labels/2");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([{"id": 2}]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1/labels/3");
            then.status(404).body("not found");
        });

        let client = client_for(&server).with_token("tok");
        assert!(matches!(client.label_color("1"), Err(ClientError::Payload(_))));
        assert!(matches!(client.label_color("2"), Err(ClientError::Payload(_))));
        assert!(matches!(client.label_color("3"), Err(ClientError::Http(404, _))));

        let err = client.resolve_color("3").unwrap_err();
        assert_eq!(err.label_id, "3");
        assert_eq!(err.reason, "HTTP 404: not found");
    }

    #[test]
    fn test_login_then_fetch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/login");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"oauth": {"access_token": "fresh"}}));
        });
        let vehicles = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/vehicles/select/active")
                .header("authorization", "Bearer fresh");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([]));
        });

        let mut client = client_for(&server);
        assert!(!client.is_authenticated());
        client
            .login(&LoginCredentials {
                username: "365".into(),
                password: "1".into(),
                client_auth: "QUJD".into(),
            })
            .unwrap();
        assert!(client.is_authenticated());

        let set = client.fetch_vehicles().unwrap();
        vehicles.assert();
        assert!(set.is_empty());
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..ApiConfig::default()
        };
        let client = ApiClient::new(config).unwrap().with_token("tok");
        assert!(matches!(client.fetch_vehicles(), Err(ClientError::Network(_))));
    }
}
