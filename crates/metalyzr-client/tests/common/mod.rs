//! Common test infrastructure for metalyzr-client tests
//!
//! # Modules
//!
//! - `mock_server`: Wiremock setup helpers for Metalyzr endpoints
//! - `flaky_server`: Raw TCP server that drops connections before answering
//! - `executors`: Executor factories with short test-friendly delays

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod executors;
pub mod flaky_server;
pub mod mock_server;

pub use executors::*;
pub use flaky_server::*;
pub use mock_server::*;
