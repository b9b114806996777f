//! # metalyzr-client
//!
//! Resilient request core for the Metalyzr API:
//! - `error`: classification of every request failure into one `ClassifiedError`
//! - `executor`: per-attempt timeout, bounded retries with exponential backoff
//! - `operation`: observable idle/loading/success/error state machine for any async operation
//! - `resource`: an endpoint bound to an operation, with auto-fetch and polling
//! - `store`: process-wide dashboard state with a bounded error log and optional persistence
//! - `dashboard`: the stats/health/tournaments/archetypes resources wired into the store

pub mod api;
pub mod dashboard;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod operation;
pub mod request;
pub mod resource;
pub mod store;

pub use api::MetalyzrApi;
pub use dashboard::Dashboard;
pub use envelope::Envelope;
pub use error::{ClassifiedError, ErrorKind};
pub use executor::{RequestExecutor, RequestExecutorBuilder};
pub use operation::{AsyncOperation, OperationState, OperationStatus};
pub use request::RequestDescriptor;
pub use resource::{Resource, ResourceOptions, ResourceView};
pub use store::{Connectivity, SharedState, SharedStore, StatsUpdate};
