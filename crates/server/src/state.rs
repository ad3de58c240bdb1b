use std::sync::Arc;

use adlens_core::Config;
use adlens_creative::CreativeEngine;

use crate::spec_cache::SpecCache;
use crate::upstream::{PerformanceSource, SpecSource};

/// Shared, read-mostly application state. The only mutable piece is the
/// spec cache, which guards itself.
pub struct AppState {
    pub config: Config,
    pub engine: CreativeEngine,
    pub spec_cache: SpecCache,
    pub spec_source: Arc<dyn SpecSource>,
    pub performance: Arc<dyn PerformanceSource>,
}
