use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AdlensError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub spec: SpecConfig,
    pub scoring: ScoringConfig,
    pub recommend: RecommendConfig,
    pub vocabulary: VocabularyConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ADLENS_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ADLENS_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            upstream: UpstreamConfig::from_env_profiled(p),
            spec: SpecConfig::from_env_profiled(p),
            scoring: ScoringConfig::from_env_profiled(p),
            recommend: RecommendConfig::from_env_profiled(p),
            vocabulary: VocabularyConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject combinations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.spec.source == SpecSourceKind::Http && self.upstream.spec_url().is_none() {
            return Err(AdlensError::Config(
                "SPEC_SOURCE=http requires UPSTREAM_BASE_URL or SPEC_URL".into(),
            ));
        }
        if self.upstream.base_url.is_none() {
            return Err(AdlensError::Config(
                "UPSTREAM_BASE_URL is required for the item report and cohort medians".into(),
            ));
        }
        if self.recommend.limit == 0 {
            return Err(AdlensError::Config("RECOMMEND_LIMIT must be at least 1".into()));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  upstream:    base_url={}, timeout={}s",
            self.upstream.base_url.as_deref().unwrap_or("(none)"),
            self.upstream.timeout_secs
        );
        tracing::info!("  spec:        source={}, ttl={}s", self.spec.source, self.spec.ttl_secs);
        tracing::info!(
            "  scoring:     roas_target={}, cpa_target={}",
            self.scoring.roas_target, self.scoring.cpa_target
        );
        tracing::info!(
            "  recommend:   limit={}, top_n={}, image_cap={}",
            self.recommend.limit, self.recommend.top_n, self.recommend.image_cap
        );
        tracing::info!(
            "  vocabulary:  {}",
            self.vocabulary
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "upstream": {
                "configured": self.upstream.base_url.is_some(),
                "report_path": self.upstream.report_path,
                "medians_path": self.upstream.medians_path,
                "timeout_secs": self.upstream.timeout_secs,
                "has_token": self.upstream.api_token.is_some(),
            },
            "spec": { "source": self.spec.source, "ttl_secs": self.spec.ttl_secs },
            "scoring": {
                "roas_target": self.scoring.roas_target,
                "cpa_target": self.scoring.cpa_target,
            },
            "recommend": {
                "limit": self.recommend.limit,
                "top_n": self.recommend.top_n,
                "image_cap": self.recommend.image_cap,
            },
            "vocabulary": { "custom": self.vocabulary.path.is_some() },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_parse(p, "PORT", 3001),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Upstream collaborators ────────────────────────────────────

/// Where the policy spec, item report and cohort medians are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    /// Absolute spec URL; overrides `{base_url}{spec_path}`.
    pub spec_url_override: Option<String>,
    pub spec_path: String,
    pub report_path: String,
    pub medians_path: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            base_url: profiled_env_opt(p, "UPSTREAM_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string()),
            spec_url_override: profiled_env_opt(p, "SPEC_URL"),
            spec_path: profiled_env_or(p, "SPEC_PATH", "/api/specs"),
            report_path: profiled_env_or(p, "REPORT_PATH", "/api/creative-report"),
            medians_path: profiled_env_or(p, "MEDIANS_PATH", "/api/cohort-medians"),
            api_token: profiled_env_opt(p, "UPSTREAM_API_TOKEN"),
            timeout_secs: profiled_env_parse(p, "UPSTREAM_TIMEOUT_SECS", 20),
        }
    }

    pub fn spec_url(&self) -> Option<String> {
        self.spec_url_override.clone().or_else(|| {
            self.base_url
                .as_ref()
                .map(|base| format!("{}{}", base, self.spec_path))
        })
    }

    pub fn report_url(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}{}", base, self.report_path))
    }

    pub fn medians_url(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}{}", base, self.medians_path))
    }
}

// ── Policy spec ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecSourceKind {
    /// Fetch the policy from the upstream specs endpoint.
    Http,
    /// Use the built-in default policy.
    Static,
}

impl std::fmt::Display for SpecSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecSourceKind::Http => write!(f, "http"),
            SpecSourceKind::Static => write!(f, "static"),
        }
    }
}

impl std::str::FromStr for SpecSourceKind {
    type Err = AdlensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(SpecSourceKind::Http),
            "static" => Ok(SpecSourceKind::Static),
            other => Err(AdlensError::Config(format!(
                "unknown SPEC_SOURCE '{}' (expected http or static)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecConfig {
    pub source: SpecSourceKind,
    /// How long a fetched policy stays valid before it is fetched again.
    pub ttl_secs: u64,
}

impl SpecConfig {
    fn from_env_profiled(p: &str) -> Self {
        let source = profiled_env_opt(p, "SPEC_SOURCE")
            .and_then(|raw| match raw.parse() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::warn!("{}; falling back to the static policy", e);
                    None
                }
            })
            .unwrap_or(SpecSourceKind::Static);
        Self {
            source,
            ttl_secs: profiled_env_parse(p, "SPEC_TTL_SECS", 300),
        }
    }
}

// ── Scoring thresholds ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub roas_target: f64,
    pub cpa_target: f64,
}

impl ScoringConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            roas_target: profiled_env_parse(p, "ROAS_TARGET", 1.3),
            cpa_target: profiled_env_parse(p, "CPA_TARGET", 18.0),
        }
    }
}

// ── Recommendations ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendConfig {
    pub limit: usize,
    /// How many leading report items are mined for headline templates.
    pub top_n: usize,
    pub image_cap: usize,
}

impl RecommendConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            limit: profiled_env_parse(p, "RECOMMEND_LIMIT", 20),
            top_n: profiled_env_parse(p, "RECOMMEND_TOP_N", 10),
            image_cap: profiled_env_parse(p, "IMAGE_BRIEF_CAP", 12),
        }
    }
}

// ── Vocabulary ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// YAML vocabulary table; the built-in table is used when unset.
    pub path: Option<PathBuf>,
}

impl VocabularyConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            path: profiled_env_opt(p, "VOCABULARY_PATH").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("ADLENS_CFGTEST_ROAS_TARGET", "2.5");
        env::set_var("ROAS_TARGET_UNUSED_BY_CFGTEST", "9");
        let config = Config::for_profile("adlens_cfgtest");
        assert_eq!(config.profile, "ADLENS_CFGTEST");
        assert_eq!(config.scoring.roas_target, 2.5);
        env::remove_var("ADLENS_CFGTEST_ROAS_TARGET");
        env::remove_var("ROAS_TARGET_UNUSED_BY_CFGTEST");
    }

    #[test]
    fn upstream_urls_join_base_and_path() {
        let upstream = UpstreamConfig {
            base_url: Some("https://dash.example.com".into()),
            spec_url_override: None,
            spec_path: "/api/specs".into(),
            report_path: "/api/creative-report".into(),
            medians_path: "/api/cohort-medians".into(),
            api_token: None,
            timeout_secs: 5,
        };
        assert_eq!(
            upstream.spec_url().as_deref(),
            Some("https://dash.example.com/api/specs")
        );
        assert_eq!(
            upstream.report_url().as_deref(),
            Some("https://dash.example.com/api/creative-report")
        );

        let overridden = UpstreamConfig {
            spec_url_override: Some("https://specs.example.com/v2".into()),
            ..upstream
        };
        assert_eq!(
            overridden.spec_url().as_deref(),
            Some("https://specs.example.com/v2")
        );
    }

    #[test]
    fn spec_source_parses_case_insensitively() {
        assert_eq!("HTTP".parse::<SpecSourceKind>().unwrap(), SpecSourceKind::Http);
        assert_eq!("static".parse::<SpecSourceKind>().unwrap(), SpecSourceKind::Static);
        assert!("s3".parse::<SpecSourceKind>().is_err());
    }

    #[test]
    fn validate_requires_upstream_base_url() {
        let mut config = Config::for_profile("ADLENS_VALIDATE_TEST");
        config.upstream.base_url = None;
        config.spec.source = SpecSourceKind::Static;
        assert!(matches!(config.validate(), Err(AdlensError::Config(_))));

        config.upstream.base_url = Some("http://localhost:3000".into());
        assert!(config.validate().is_ok());
    }
}
