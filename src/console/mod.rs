//! Record console subsystem: the browser client's logic as a Rust library.
//!
//! # Data Flow
//! ```text
//! user input
//!     → form.rs (draft state, pre-network validation)
//!     → view.rs (submit/append/delete flows, table rendering)
//!     → api.rs (cookie-carrying HTTP calls to the gateway)
//!
//! business-key keystrokes
//!     → debounce.rs (cancellable timer, stale-completion guard)
//!     → api.rs check endpoint → advisory verdict
//! ```

pub mod api;
pub mod debounce;
pub mod form;
pub mod view;

pub use api::{ConsoleApi, ConsoleError, CustomerRecord};
pub use debounce::{CheckVerdict, DuplicateChecker, DEBOUNCE_DELAY};
pub use form::{RecordDraft, ValidationError};
pub use view::{RecordsView, SubmitOutcome};
