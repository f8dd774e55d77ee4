//! opcflow core
//!
//! The reusable request/poll engine behind every opcflow resource client.
//! Remote create and delete calls on the target APIs complete
//! asynchronously; this crate turns them into single awaited calls with a
//! bounded wait.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │      resource layer (opcflow-resources)       │
//! │   create → poll(read + classify) → result     │
//! └───────┬───────────────────────────┬──────────┘
//!         │                           │
//! ┌───────▼────────┐          ┌───────▼────────┐
//! │ ResourceClient │          │     poll       │
//! │  + PathTemplate│          │ StateClassifier│
//! └───────┬────────┘          └────────────────┘
//!         │
//! ┌───────▼────────┐   ┌───────────────┐
//! │   Transport    │──▶│ Authenticator │
//! │ (retry, errors)│   └───────────────┘
//! └───────┬────────┘
//!         │ HttpBackend (reqwest)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use opcflow_core::{Client, ClientConfig, Credentials, ResourceDescriptor};
//!
//! const VLBR: ResourceDescriptor =
//!     ResourceDescriptor::new("load balancer", "/{region}/vlbrs", "/{region}/vlbrs/{name}");
//!
//! let client = Client::new(ClientConfig::new(endpoint, Credentials::new(domain, user, pass)))?;
//! let lbs = client.resource(VLBR);
//! lbs.delete(&client.context(), "lb1").await?;
//! ```

pub mod auth;
pub mod client;
pub mod decode;
pub mod error;
pub mod path;
pub mod poll;
pub mod reconcile;
pub mod resource;
pub mod state;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-exports
pub use auth::{AuthScheme, Authenticator, Credentials, TENANT_HEADER};
pub use client::{Client, ClientConfig};
pub use decode::{decode, decode_value, weak};
pub use error::{OpcError, OperationError, Result, STATUS_NOT_FOUND};
pub use path::{PathContext, PathTemplate, Projection, ResourceDescriptor};
pub use poll::{
    DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PollSpec, poll, poll_cancellable, wait_for,
    wait_for_cancellable,
};
pub use reconcile::{wait_for_deletion, wait_for_state};
pub use resource::{Named, ResourceClient};
pub use state::{Classification, ResourceState, StateClassifier};
pub use tokio_util::sync::CancellationToken;

#[doc(hidden)]
pub use serde as __serde;
pub use transport::{HttpBackend, HttpRequest, HttpResponse, ReqwestBackend, Transport};
