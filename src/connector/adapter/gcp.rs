use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-central1";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const METADATA_TIMEOUT: Duration = Duration::from_secs(2);
/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_BUFFER: Duration = Duration::from_secs(300);
/// Lifetime assumed when the issuer does not report one.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// HTTP client used by the Google API adapters. If the configured client
/// cannot be built, the failure is logged and reqwest's defaults are used,
/// without the timeout.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(
                "Failed to build HTTP client with a {:?} timeout, falling back to defaults: {}",
                timeout, e
            );
            reqwest::Client::new()
        }
    }
}

/// Project and region shared by the Vertex AI and Firestore clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcpSettings {
    project_id: Option<String>,
    region: String,
}

impl GcpSettings {
    pub fn new(project_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            region: region.into(),
        }
    }

    /// Read settings from the process environment:
    ///
    /// | Variable               | Purpose                                   |
    /// |------------------------|-------------------------------------------|
    /// | `GOOGLE_CLOUD_PROJECT` | Project id (checked first)                |
    /// | `GCLOUD_PROJECT`       | Project id (checked second)               |
    /// | `FIREBASE_CONFIG`      | Legacy JSON config; its `projectId` last  |
    /// | `FUNCTION_REGION`      | Region (checked first)                    |
    /// | `GCP_REGION`           | Region, defaults to `us-central1`         |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project_id = non_empty("GOOGLE_CLOUD_PROJECT")
            .or_else(|| non_empty("GCLOUD_PROJECT"))
            .or_else(|| non_empty("FIREBASE_CONFIG").and_then(|raw| project_from_firebase_config(&raw)));

        let region = non_empty("FUNCTION_REGION")
            .or_else(|| non_empty("GCP_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Self { project_id, region }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseConfig {
    project_id: Option<String>,
}

fn project_from_firebase_config(raw: &str) -> Option<String> {
    serde_json::from_str::<FirebaseConfig>(raw)
        .ok()
        .and_then(|c| c.project_id)
        .filter(|p| !p.is_empty())
}

#[derive(Debug, Error)]
#[error("Failed to obtain GCP access token: {0}")]
pub struct TokenError(String);

/// Supplies OAuth bearer tokens for Google APIs.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, TokenError>;
}

/// A fixed token, for emulators and tests.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, TokenError> {
        Ok(self.token.clone())
    }
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Application Default Credentials: the GCP metadata server (Cloud Run,
/// Cloud Functions, GCE, GKE) first, then the local `gcloud` CLI.
///
/// Tokens are cached and refreshed five minutes before they expire.
pub struct AdcTokenProvider {
    client: reqwest::Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl AdcTokenProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(METADATA_TIMEOUT),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    async fn fetch(&self) -> Result<(String, Duration), TokenError> {
        match self.fetch_from_metadata_server().await {
            Ok(token) => {
                debug!("Obtained GCP token from metadata server");
                return Ok(token);
            }
            Err(e) => debug!("Metadata server token unavailable: {}", e),
        }

        let token = self.fetch_from_gcloud().await?;
        debug!("Obtained GCP token from gcloud CLI");
        Ok((token, DEFAULT_TOKEN_LIFETIME))
    }

    async fn fetch_from_metadata_server(&self) -> Result<(String, Duration), TokenError> {
        let response = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| TokenError(format!("metadata server request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TokenError(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let body: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| TokenError(format!("failed to parse metadata token: {e}")))?;

        let lifetime = body
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        Ok((body.access_token, lifetime))
    }

    async fn fetch_from_gcloud(&self) -> Result<String, TokenError> {
        let output = Command::new("gcloud")
            .args(["auth", "application-default", "print-access-token"])
            .output()
            .await
            .map_err(|e| TokenError(format!("failed to run gcloud: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TokenError(format!("gcloud auth failed: {}", stderr.trim())));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(TokenError("gcloud returned an empty token".to_string()));
        }
        Ok(token)
    }
}

impl Default for AdcTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccessTokenProvider for AdcTokenProvider {
    async fn access_token(&self) -> Result<String, TokenError> {
        {
            let cached = self.cached.read().await;
            if let Some(ref token) = *cached {
                if token.refresh_at > Instant::now() {
                    return Ok(token.token.clone());
                }
            }
        }

        let (token, lifetime) = self.fetch().await?;
        let mut cached = self.cached.write().await;
        *cached = Some(CachedToken {
            token: token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_BUFFER),
        });

        Ok(token)
    }
}
