//! API middleware

pub mod logging;
pub mod service_auth;

pub use logging::logging_middleware;
pub use service_auth::{RequireService, ServiceIdentity};
