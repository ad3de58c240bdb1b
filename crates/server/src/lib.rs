//! HTTP surface for creative headline analysis.

pub mod api;
pub mod app_config;
pub mod router;
pub mod spec_cache;
pub mod state;
pub mod upstream;

pub use router::build_router;
pub use state::AppState;
