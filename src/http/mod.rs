//! HTTP gateway subsystem.
//!
//! # Data Flow
//! ```text
//! Browser request
//!     → server.rs (Axum setup, middleware, session guard)
//!     → handlers.rs (login/logout/session, record passthrough)
//!     → [upstream subsystem forwards and corrects]
//!     → error.rs (fixed envelopes for gateway-level failures)
//!     → Send to browser
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::GatewayError;
pub use server::{AppState, HttpServer};
