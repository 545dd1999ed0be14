//! Presentation Layer
//!
//! Verifying middleware, handlers and DTOs for the API.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
