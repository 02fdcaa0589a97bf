//! Core traits, settings, clock, and module registry shared by Vitrine crates.

pub mod clock;
pub mod module;
pub mod registry;
pub mod settings;

pub use clock::{Clock, FixedClock, SystemClock};
pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
