//! Tracing and logging configuration for the application
//!
//! This module provides structured logging with different configurations
//! for development and production environments.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Initialize tracing/logging based on the environment
///
/// # Development Mode
/// - Pretty-printed, human-readable logs
/// - Default level: DEBUG
/// - Shows file locations and line numbers
///
/// # Production Mode
/// - JSON-formatted structured logs
/// - Default level: INFO
///
/// # Environment Variables
/// - `RUST_LOG`: Override default log level (e.g., `RUST_LOG=cogq_core=trace`)
///
/// Calling this again once a subscriber is installed does nothing.
pub fn init_tracing(env: Environment) {
    let installed = if env.is_development() {
        init_development_tracing()
    } else {
        init_production_tracing()
    };

    if installed {
        tracing::info!(?env, "Tracing initialized");
    }
}

fn init_development_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .pretty()
                .with_filter(env_filter),
        )
        .try_init()
        .is_ok()
}

fn init_production_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .flatten_event(true)
                .with_target(true)
                .with_filter(env_filter),
        )
        .try_init()
        .is_ok()
}
