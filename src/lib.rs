//! Session-authenticated gateway for a customer record service.

pub mod config;
pub mod console;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod session;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
