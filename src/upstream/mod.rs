//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! handler (method, path, JSON body)
//!     → target.rs (which base URL to use)
//!     → client.rs (build request, send, parse JSON)
//!     → on misconfiguration signature: target.rs one-shot correction
//!     → retry once against the fallback
//!     → (status, JSON) relayed to the handler, or UpstreamError
//! ```

pub mod client;
pub mod error;
pub mod target;

pub use client::{UpstreamClient, UpstreamResponse};
pub use error::UpstreamError;
pub use target::UpstreamTarget;
