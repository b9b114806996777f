//! Configuration loading and management

mod loader;

pub use loader::{HierarchicalConfigLoader, CONFIG_FILE_NAME};
