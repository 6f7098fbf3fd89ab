//! Session management subsystem.
//!
//! # Data Flow
//! ```text
//! POST /login success
//!     → store.rs creates token → identity entry
//!     → cookie.rs encodes Set-Cookie for the browser
//!
//! Authenticated request
//!     → cookie.rs extracts token from Cookie header
//!     → store.rs resolves token → identity (or expired/absent)
//!
//! Background
//!     → store.rs sweeper drops expired entries
//! ```

pub mod cookie;
pub mod store;

pub use store::{run_sweeper, Session, SessionStore};
