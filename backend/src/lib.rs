//! Backend library modules for the case file tracking service.

pub mod bootstrap;
pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Access-log middleware applied to every request.
pub use middleware::RequestLog;
