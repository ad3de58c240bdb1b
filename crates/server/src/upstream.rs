//! Upstream collaborators: the policy spec, the item report and the cohort
//! medians.
//!
//! Sources return raw JSON for the report and medians; decoding lives in
//! `adlens_creative::report` so bad rows can be skipped one at a time.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use adlens_core::config::UpstreamConfig;
use adlens_creative::{HeadlineSpec, ImageSpec, PolicySpec};

/// Errors talking to an upstream collaborator.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Non-2xx answer. Status and body are relayed to our caller unchanged.
    #[error("upstream returned HTTP {status}")]
    Status {
        status: u16,
        content_type: Option<String>,
        body: String,
    },

    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Supplies the current ad-policy spec.
#[async_trait]
pub trait SpecSource: Send + Sync {
    async fn fetch_spec(&self) -> Result<PolicySpec, UpstreamError>;

    /// Short label for logs and `/health`.
    fn name(&self) -> &'static str;
}

/// Supplies the per-item report and cohort medians for a date range.
#[async_trait]
pub trait PerformanceSource: Send + Sync {
    /// `{ "items": [...] }` for `date`.
    async fn fetch_report(&self, date: &str) -> Result<serde_json::Value, UpstreamError>;

    /// `{ "medians": { "ctr", "cvr" } }` for `date`.
    async fn fetch_medians(&self, date: &str) -> Result<serde_json::Value, UpstreamError>;
}

// ── HTTP plumbing ─────────────────────────────────────────────────

/// Shared reqwest client with the upstream bearer token and timeout applied.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    api_token: Option<String>,
}

impl UpstreamClient {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_token: config.api_token.clone(),
        })
    }

    async fn get_json(
        &self,
        url: &str,
        date: Option<&str>,
    ) -> Result<serde_json::Value, UpstreamError> {
        let mut request = self.client.get(url);
        if let Some(date) = date {
            request = request.query(&[("date", date)]);
        }
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        debug!("upstream GET {}", url);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                content_type,
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

// ── Spec sources ──────────────────────────────────────────────────

/// Upstream spec document. `fetchedAt` is stamped locally when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpecDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    fetched_at: Option<DateTime<Utc>>,
    headline: HeadlineSpec,
    image: ImageSpec,
}

impl SpecDocument {
    fn into_spec(self) -> PolicySpec {
        PolicySpec {
            version: self.version.unwrap_or_else(|| "unversioned".to_string()),
            fetched_at: self.fetched_at.unwrap_or_else(Utc::now),
            headline: self.headline,
            image: self.image,
        }
    }
}

/// Fetches the spec from the upstream specs endpoint.
pub struct HttpSpecSource {
    client: UpstreamClient,
    url: String,
}

impl HttpSpecSource {
    pub fn new(client: UpstreamClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SpecSource for HttpSpecSource {
    async fn fetch_spec(&self) -> Result<PolicySpec, UpstreamError> {
        let value = self.client.get_json(&self.url, None).await?;
        let doc: SpecDocument =
            serde_json::from_value(value).map_err(|e| UpstreamError::Decode(e.to_string()))?;
        Ok(doc.into_spec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Built-in policy, stamped with the time of each fetch.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSpecSource;

#[async_trait]
impl SpecSource for StaticSpecSource {
    async fn fetch_spec(&self) -> Result<PolicySpec, UpstreamError> {
        Ok(PolicySpec::builtin(Utc::now()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// ── Performance source ────────────────────────────────────────────

/// Fetches the item report and cohort medians over HTTP.
pub struct HttpPerformanceSource {
    client: UpstreamClient,
    report_url: Option<String>,
    medians_url: Option<String>,
}

impl HttpPerformanceSource {
    pub fn new(client: UpstreamClient, config: &UpstreamConfig) -> Self {
        Self {
            client,
            report_url: config.report_url(),
            medians_url: config.medians_url(),
        }
    }
}

#[async_trait]
impl PerformanceSource for HttpPerformanceSource {
    async fn fetch_report(&self, date: &str) -> Result<serde_json::Value, UpstreamError> {
        let url = self
            .report_url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("item report URL"))?;
        self.client.get_json(url, Some(date)).await
    }

    async fn fetch_medians(&self, date: &str) -> Result<serde_json::Value, UpstreamError> {
        let url = self
            .medians_url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("cohort medians URL"))?;
        self.client.get_json(url, Some(date)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_document_defaults_version_and_timestamp() {
        let doc: SpecDocument = serde_json::from_value(serde_json::json!({
            "headline": { "maxChars": 40, "warnAt": 30, "noAllCaps": false },
            "image": { "aspect": "1:1", "recommended": "1080x1080", "maxSizeMB": 2, "formats": ["png"] }
        }))
        .unwrap();
        let spec = doc.into_spec();
        assert_eq!(spec.version, "unversioned");
        assert_eq!(spec.headline.max_chars, 40);
        assert_eq!(spec.image.max_size_mb, 2.0);
    }

    #[test]
    fn spec_document_keeps_upstream_identity() {
        let doc: SpecDocument = serde_json::from_value(serde_json::json!({
            "version": "2024-06",
            "fetchedAt": "2024-06-01T00:00:00Z",
            "headline": { "maxChars": 60, "warnAt": 45, "noAllCaps": true },
            "image": { "aspect": "1.91:1", "recommended": "1200x628", "maxSizeMB": 5 }
        }))
        .unwrap();
        let spec = doc.into_spec();
        assert_eq!(spec.version, "2024-06");
        assert_eq!(spec.fetched_at.to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert!(spec.image.formats.is_empty());
    }

    #[tokio::test]
    async fn static_source_serves_builtin_policy() {
        let spec = StaticSpecSource.fetch_spec().await.unwrap();
        assert_eq!(spec.version, "builtin-1");
        assert_eq!(StaticSpecSource.name(), "static");
    }

    #[tokio::test]
    async fn unconfigured_report_url_is_reported() {
        let config = UpstreamConfig {
            base_url: None,
            spec_url_override: None,
            spec_path: "/api/specs".into(),
            report_path: "/api/creative-report".into(),
            medians_path: "/api/cohort-medians".into(),
            api_token: None,
            timeout_secs: 1,
        };
        let client = UpstreamClient::from_config(&config).unwrap();
        let source = HttpPerformanceSource::new(client, &config);
        assert!(matches!(
            source.fetch_report("today").await,
            Err(UpstreamError::NotConfigured(_))
        ));
    }
}
