//! Shared test helpers for integration tests.

#![allow(dead_code)]

use primeprobe::config::ServerConfig;
use primeprobe::dashboard::{build_router, AppState};
use std::sync::Arc;

/// Test configuration: default oracle, progress logging off.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        progress_interval_secs: 0,
        ..ServerConfig::default()
    }
}

/// Router plus the state behind it, so tests can inspect the cache.
pub fn build_test_app_with(config: ServerConfig) -> (axum::Router, Arc<AppState>) {
    let state = AppState::new(config);
    (build_router(Arc::clone(&state)), state)
}

pub fn build_test_app() -> axum::Router {
    build_test_app_with(test_config()).0
}
