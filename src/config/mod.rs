//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → env overrides (API_BASE, PORT)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the only later change is the one-shot
//!   upstream base correction, which lives in the upstream subsystem
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::GatewayConfig;
pub use schema::ObservabilityConfig;
pub use schema::SessionConfig;
pub use schema::UpstreamConfig;
pub use schema::DEFAULT_UPSTREAM_BASE;
