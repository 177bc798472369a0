use crate::{
    auth::Session,
    config::Keep as KeepConfig,
    keep::{
        alert::AlertDto,
        preset::Preset,
        provider::{Provider, ProvidersResponse},
        settings::{ApiKeyResponse, RuntimeConfig, User},
        workflow::Workflow,
    },
    metrics::external::{Target, external_request_timer, record_external_request_failure},
};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;

pub mod alert;
pub mod preset;
pub mod provider;
pub mod settings;
pub mod workflow;

/// A backend request that completed with a non-success status
#[derive(Debug, thiserror::Error)]
#[error("{target} request failed: HTTP {status}")]
pub struct ApiError {
    pub target: String,
    pub status: StatusCode,
}

/// Backends send `null` for optional collections and flags; read it as the default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Typed client for the alerting backend
#[derive(Clone)]
pub struct KeepClient {
    config: KeepConfig,
    ui_url: String,
    session: Session,
    client: reqwest::Client,
}

impl KeepClient {
    /// Create a new client
    pub fn new(config: KeepConfig, ui_url: String, session: Session) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            config,
            ui_url: ui_url.trim_end_matches('/').to_string(),
            session,
            client,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, target: Target, url: String) -> anyhow::Result<T> {
        let _timer = external_request_timer(target);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.session.access_token)
            .send()
            .await
            .inspect_err(|_| record_external_request_failure(target))?;

        if !response.status().is_success() {
            record_external_request_failure(target);
            return Err(ApiError {
                target: target.to_string(),
                status: response.status(),
            }
            .into());
        }

        Ok(response.json::<T>().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        target: Target,
        url: String,
        body: &B,
    ) -> anyhow::Result<()> {
        let _timer = external_request_timer(target);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.session.access_token)
            .json(body)
            .send()
            .await
            .inspect_err(|_| record_external_request_failure(target))?;

        if !response.status().is_success() {
            record_external_request_failure(target);
            return Err(ApiError {
                target: target.to_string(),
                status: response.status(),
            }
            .into());
        }

        Ok(())
    }

    /// Get all alerts
    #[tracing::instrument(skip(self))]
    pub async fn get_alerts(&self) -> anyhow::Result<Vec<AlertDto>> {
        tracing::debug!("Fetching alerts");
        self.get_json(Target::Alerts, self.url("/alerts")).await
    }

    /// Get the presets saved by users of the tenant
    #[tracing::instrument(skip(self))]
    pub async fn get_presets(&self) -> anyhow::Result<Vec<Preset>> {
        tracing::debug!("Fetching saved presets");
        self.get_json(Target::Presets, self.url("/preset")).await
    }

    /// Get installed providers
    #[tracing::instrument(skip(self))]
    pub async fn get_installed_providers(&self) -> anyhow::Result<Vec<Provider>> {
        tracing::debug!("Fetching installed providers");
        let response: ProvidersResponse = self
            .get_json(Target::Providers, self.url("/providers"))
            .await?;

        Ok(response.installed_providers)
    }

    /// Get workflows that can be run against an alert
    #[tracing::instrument(skip(self))]
    pub async fn get_workflows(&self) -> anyhow::Result<Vec<Workflow>> {
        tracing::debug!("Fetching workflows");
        self.get_json(Target::Workflows, self.url("/workflows")).await
    }

    /// Attach enrichments to a single alert
    #[tracing::instrument(skip(self))]
    pub async fn enrich_alert(
        &self,
        fingerprint: &str,
        enrichments: BTreeMap<String, String>,
    ) -> anyhow::Result<()> {
        tracing::info!("Enriching alert");

        let body = serde_json::json!({
            "fingerprint": fingerprint,
            "enrichments": enrichments,
        });
        self.post_json(Target::Enrichment, self.url("/alerts/enrich"), &body)
            .await
    }

    /// Attach the same enrichments to several alerts
    #[tracing::instrument(skip(self))]
    pub async fn batch_enrich_alerts(
        &self,
        fingerprints: &[String],
        enrichments: BTreeMap<String, String>,
    ) -> anyhow::Result<()> {
        tracing::info!("Enriching {} alerts", fingerprints.len());

        let body = serde_json::json!({
            "fingerprints": fingerprints,
            "enrichments": enrichments,
        });
        self.post_json(Target::Enrichment, self.url("/alerts/batch_enrich"), &body)
            .await
    }

    /// Run a workflow with an alert as its input event
    #[tracing::instrument(skip(self, alert))]
    pub async fn run_workflow(&self, workflow_id: &str, alert: &AlertDto) -> anyhow::Result<()> {
        tracing::info!("Running workflow for alert '{}'", alert.fingerprint());

        self.post_json(
            Target::Workflows,
            self.url(&format!("/workflows/{}/run", workflow_id)),
            alert,
        )
        .await
    }

    /// Get the tenant API key
    #[tracing::instrument(skip(self))]
    pub async fn get_api_key(&self) -> anyhow::Result<String> {
        let response: ApiKeyResponse = self
            .get_json(Target::ApiKey, self.url("/settings/apikey"))
            .await?;

        Ok(response.api_key)
    }

    /// Get users of the tenant
    #[tracing::instrument(skip(self))]
    pub async fn get_users(&self) -> anyhow::Result<Vec<User>> {
        self.get_json(Target::Users, self.url("/settings/users"))
            .await
    }

    /// Create a user
    #[tracing::instrument(skip(self, password))]
    pub async fn add_user(&self, email: &str, password: &str) -> anyhow::Result<()> {
        tracing::info!("Adding user");

        // The email is a single path segment, whatever characters it holds
        let mut url = Url::parse(&self.url("/settings/users"))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Backend URL {} cannot take a path", self.config.url))?
            .push(email);

        let body = serde_json::json!({ "password": password });
        self.post_json(Target::Users, url.to_string(), &body).await
    }

    /// Get the runtime configuration of the dashboard
    #[tracing::instrument(skip(self))]
    pub async fn get_runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        self.get_json(Target::RuntimeConfig, format!("{}/api/config", self.ui_url))
            .await
    }
}
