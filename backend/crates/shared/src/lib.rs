//! Shared Kernel - Cross-crate minimal core
//!
//! This crate contains the vocabulary every other crate agrees on:
//! - The unified [`error::app_error::AppError`] type and its result alias
//! - The [`error::kind::ErrorKind`] classification mapped to HTTP statuses
//! - Conversions from JSON errors and into axum responses
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and mean the same thing to the signing core, the transport and the server.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
