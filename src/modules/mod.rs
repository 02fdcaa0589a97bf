pub mod image_collections;

use std::sync::Arc;

use vitrine_kernel::{settings::Settings, Clock, ModuleRegistry};

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<()> {
    registry.register(image_collections::create_module(settings, clock))?;
    Ok(())
}
