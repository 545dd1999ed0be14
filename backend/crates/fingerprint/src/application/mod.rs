//! Application Layer
//!
//! Configuration shared by the middleware and the signing client.

pub mod config;
