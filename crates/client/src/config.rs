//! Endpoint settings, read from the `[api]` table of the config file.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::client::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://api.baubuddy.de/dev/index.php";
pub const DEFAULT_LOGIN_URL: &str = "https://api.baubuddy.de/index.php/login";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Prefix for the vehicle and label endpoints.
    pub base_url: String,
    /// Login is served outside `base_url`.
    pub login_url: String,
    pub vehicles_path: String,
    /// The label id is appended as one encoded path segment.
    pub labels_path: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            login_url: DEFAULT_LOGIN_URL.into(),
            vehicles_path: "/v1/vehicles/select/active".into(),
            labels_path: "/v1/labels/".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize)]
struct ApiTable {
    #[serde(default)]
    api: ApiConfig,
}

impl ApiConfig {
    /// Read and validate the `[api]` table. Other tables are ignored.
    pub fn from_toml(input: &str) -> Result<Self, ClientError> {
        let table: ApiTable =
            toml::from_str(input).map_err(|e| ClientError::Config(e.to_string()))?;
        table.api.validate()?;
        Ok(table.api)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        for (name, url) in [("api.base_url", &self.base_url), ("api.login_url", &self.login_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ClientError::Config(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("api.timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn vehicles_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.vehicles_path)
    }

    /// Label endpoint for one id. The id is a single, percent-encoded path
    /// segment.
    pub fn label_url(&self, label_id: &str) -> Result<Url, ClientError> {
        let base = format!("{}{}", self.base_url.trim_end_matches('/'), self.labels_path);
        let mut url = Url::parse(&base)
            .map_err(|e| ClientError::Config(format!("bad label URL '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Config(format!("bad label URL '{base}'")))?
            .pop_if_empty()
            .push(label_id);
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build_known_urls() {
        let config = ApiConfig::default();
        assert_eq!(
            config.vehicles_url(),
            "https://api.baubuddy.de/dev/index.php/v1/vehicles/select/active"
        );
        assert_eq!(
            config.label_url("76").unwrap().as_str(),
            "https://api.baubuddy.de/dev/index.php/v1/labels/76"
        );
    }

    #[test]
    fn test_label_id_is_one_path_segment() {
        let config = ApiConfig::default();
        assert_eq!(
            config.label_url("7/6?x#y z").unwrap().as_str(),
            "https://api.baubuddy.de/dev/index.php/v1/labels/7%2F6%3Fx%23y%20z"
        );

        let no_slash = ApiConfig { labels_path: "/v1/labels".into(), ..ApiConfig::default() };
        assert_eq!(
            no_slash.label_url("76").unwrap().as_str(),
            "https://api.baubuddy.de/dev/index.php/v1/labels/76"
        );
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let config = ApiConfig::from_toml(
            r#"
[merge]
key_field = "kurzname"

[api]
base_url = "http://localhost:8080/"
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.vehicles_url(), "http://localhost:8080/v1/vehicles/select/active");
        assert_eq!(config.login_url, DEFAULT_LOGIN_URL);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_table_is_default() {
        assert_eq!(ApiConfig::from_toml("").unwrap(), ApiConfig::default());
    }

    #[test]
    fn test_rejects_bad_url_and_zero_timeout() {
        let err = ApiConfig::from_toml("[api]\nbase_url = \"ftp://x\"\n").unwrap_err();
        assert!(err.to_string().contains("api.base_url"), "{err}");

        let err = ApiConfig::from_toml("[api]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"), "{err}");
    }

    #[test]
    fn test_syntax_error_is_config_error() {
        let err = ApiConfig::from_toml("[api\n").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
