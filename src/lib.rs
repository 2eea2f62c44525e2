pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod pricing;
pub mod server;
pub mod session;
pub mod signals;
pub mod store;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over `default_level`. Can only be called once per process.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
