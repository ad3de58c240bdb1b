//! Application configuration builders.
//!
//! Constructs the analysis engine and upstream sources from `Config`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use adlens_core::config::SpecSourceKind;
use adlens_core::Config;
use adlens_creative::CreativeEngine;

use crate::spec_cache::SpecCache;
use crate::state::AppState;
use crate::upstream::{
    HttpPerformanceSource, HttpSpecSource, PerformanceSource, SpecSource, StaticSpecSource,
    UpstreamClient,
};

/// Load configuration from `.env` and environment variables.
pub fn load_config() -> Config {
    adlens_core::config::load_dotenv();
    Config::from_env()
}

/// Build the analysis engine, loading a custom vocabulary when configured.
pub fn build_engine(config: &Config) -> anyhow::Result<CreativeEngine> {
    let engine = CreativeEngine::from_config(config).context("failed to build analysis engine")?;
    info!(
        "Analysis engine ready (limit={}, top_n={}, image_cap={})",
        engine.settings().limit,
        engine.settings().top_n,
        engine.settings().image_cap
    );
    Ok(engine)
}

pub fn build_spec_source(config: &Config) -> anyhow::Result<Arc<dyn SpecSource>> {
    match config.spec.source {
        SpecSourceKind::Static => {
            info!("Policy spec: built-in");
            Ok(Arc::new(StaticSpecSource))
        }
        SpecSourceKind::Http => {
            let url = config
                .upstream
                .spec_url()
                .context("SPEC_SOURCE=http but no spec URL is configured")?;
            let client = UpstreamClient::from_config(&config.upstream)?;
            info!("Policy spec: {}", url);
            Ok(Arc::new(HttpSpecSource::new(client, url)))
        }
    }
}

pub fn build_performance_source(config: &Config) -> anyhow::Result<Arc<dyn PerformanceSource>> {
    let client = UpstreamClient::from_config(&config.upstream)?;
    Ok(Arc::new(HttpPerformanceSource::new(client, &config.upstream)))
}

/// Assemble `AppState` from config.
pub fn build_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let engine = build_engine(&config)?;
    let spec_source = build_spec_source(&config)?;
    let performance = build_performance_source(&config)?;
    let spec_cache = SpecCache::new(Duration::from_secs(config.spec.ttl_secs));

    Ok(Arc::new(AppState {
        config,
        engine,
        spec_cache,
        spec_source,
        performance,
    }))
}
