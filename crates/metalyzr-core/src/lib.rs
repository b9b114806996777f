//! # metalyzr-core
//!
//! Core library for the Metalyzr client providing:
//! - Client configuration types and the hierarchical configuration loader
//! - A policy-driven async retry engine
//! - Payload types for the tournament, archetype and metagame endpoints

pub mod config;
pub mod error;
pub mod retry;
pub mod types;
pub mod utils;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::ClientConfig;
pub use utils::get_home_dir;
