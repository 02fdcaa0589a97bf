//! Vitrine application library
//!
//! Wires the project modules into the kernel registry and runs the HTTP
//! server around them.

// The OpenAPI fragments are large `json!` literals.
#![recursion_limit = "256"]

pub mod modules;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use vitrine_kernel::{settings::Settings, InitCtx, ModuleRegistry, SystemClock};

/// Re-export commonly used types
pub use modules::*;

/// Registry holding every project module, driven by the wall clock.
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, Arc::new(SystemClock))?;
    Ok(registry)
}

/// Run the full module lifecycle around the HTTP server until Ctrl-C.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = vitrine_http::start_server(&registry, &settings, shutdown_signal()).await;

    // Stop modules even when the server failed, then report the first error.
    let stopped = registry.stop_all().await;
    served.context("server terminated with an error")?;
    stopped
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
