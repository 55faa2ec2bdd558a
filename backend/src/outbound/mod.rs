//! Outbound adapters: persistence and credential infrastructure.

pub mod auth;
pub mod persistence;
