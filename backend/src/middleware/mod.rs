//! Actix middleware shared by the HTTP server.

pub mod request_log;

pub use request_log::RequestLog;
