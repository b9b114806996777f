//! Type definitions shared across Metalyzr crates

mod client_config;
mod payloads;

pub use client_config::*;
pub use payloads::*;
