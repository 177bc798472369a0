use crate::auth::{AuthType, Session};
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Set how often the alert feed polls the backend
    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Base URL serving `/api/config`, defaulting to this dashboard's own listener
    pub fn ui_url(&self) -> String {
        match &self.ui.url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.http.host, self.http.port),
        }
    }

    /// Session used for backend requests
    pub fn session(&self) -> Session {
        let session = Session::new(self.keep.token.clone());

        match &self.session.email {
            Some(email) => session.with_email(email.clone()),
            None => session,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub keep: Keep,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub analytics: Option<Analytics>,
    pub http: Http,
    #[serde(skip, default = "default_refresh_interval")]
    pub refresh_interval: Duration,
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone)]
pub struct Keep {
    pub url: String,
    pub token: String,
    pub insecure: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Ui {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Auth {
    #[serde(rename = "type", default)]
    pub auth_type: AuthType,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Analytics {
    pub key: Option<String>,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Http {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from file");

        let config = std::fs::read_to_string(path)?;
        Self::from_yaml(&config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_norway::from_str(yaml)?)
    }
}

/// Pick the literal value, or read it from the named environment variable when only that is set
fn resolve_secret(value: Option<String>, value_from: Option<String>) -> Result<Option<String>> {
    match (value, value_from) {
        (Some(value), _) => Ok(Some(value)),
        (None, Some(var)) => Ok(Some(std::env::var(&var).map_err(|e| {
            anyhow::anyhow!("Failed to read environment variable '{}': {}", var, e)
        })?)),
        (None, None) => Ok(None),
    }
}

impl Keep {
    /// Create a new backend config, resolving the token from an environment variable if needed
    pub fn new(
        url: String,
        token: Option<String>,
        token_from: Option<String>,
        insecure: bool,
    ) -> Result<Self> {
        let token = resolve_secret(token, token_from)?.unwrap_or_default();

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            token,
            insecure,
        })
    }
}

impl<'de> Deserialize<'de> for Keep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct KeepRaw {
            url: String,
            token: Option<String>,
            #[serde(rename = "tokenFrom")]
            token_from: Option<String>,
            #[serde(default)]
            insecure: Option<bool>,
        }

        let raw = KeepRaw::deserialize(deserializer)?;
        Keep::new(
            raw.url,
            raw.token,
            raw.token_from,
            raw.insecure.unwrap_or(false),
        )
        .map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Analytics {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct AnalyticsRaw {
            key: Option<String>,
            #[serde(rename = "keyFrom")]
            key_from: Option<String>,
            host: String,
        }

        let raw = AnalyticsRaw::deserialize(deserializer)?;

        // A missing key disables analytics rather than failing startup
        let key = match resolve_secret(raw.key, raw.key_from) {
            Ok(key) => key.filter(|key| !key.is_empty()),
            Err(e) => {
                tracing::warn!("Analytics disabled: {}", e);
                None
            }
        };

        Ok(Analytics {
            key,
            host: raw.host.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
keep:
  url: http://keep.local:8080/
  token: secret
http:
  host: 127.0.0.1
  port: 3000
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();

        assert_eq!(config.keep.url, "http://keep.local:8080");
        assert_eq!(config.keep.token, "secret");
        assert!(!config.keep.insecure);
        assert_eq!(config.auth.auth_type, AuthType::NoAuth);
        assert!(config.analytics.is_none());
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.ui_url(), "http://127.0.0.1:3000");
    }

    #[test]
    fn token_is_read_from_environment() {
        // SAFETY: the variable name is unique to this test
        unsafe { std::env::set_var("KEEP_DASHBOARD_TEST_TOKEN", "from-env") };

        let yaml = r#"
keep:
  url: http://keep.local
  tokenFrom: KEEP_DASHBOARD_TEST_TOKEN
auth:
  type: SINGLE_TENANT
session:
  email: jane@example.com
ui:
  url: http://ui.local/
http:
  host: 0.0.0.0
  port: 8000
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.keep.token, "from-env");
        assert_eq!(config.auth.auth_type, AuthType::SingleTenant);
        assert_eq!(config.ui_url(), "http://ui.local");

        let session = config.session();
        assert_eq!(session.access_token, "from-env");
        assert_eq!(session.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn missing_token_variable_fails() {
        let yaml = r#"
keep:
  url: http://keep.local
  tokenFrom: KEEP_DASHBOARD_TEST_UNSET_VARIABLE
http:
  host: 0.0.0.0
  port: 8000
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn missing_analytics_key_disables_analytics() {
        let yaml = r#"
keep:
  url: http://keep.local
http:
  host: 0.0.0.0
  port: 8000
analytics:
  keyFrom: KEEP_DASHBOARD_TEST_UNSET_ANALYTICS_KEY
  host: https://analytics.local/
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let analytics = config.analytics.unwrap();

        assert!(analytics.key.is_none());
        assert_eq!(analytics.host, "https://analytics.local");
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.http.port, 3000);
    }
}
