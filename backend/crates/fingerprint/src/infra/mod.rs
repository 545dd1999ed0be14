//! Infrastructure Layer
//!
//! Outbound HTTP.

pub mod http_client;
