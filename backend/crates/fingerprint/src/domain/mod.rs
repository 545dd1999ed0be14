//! Domain Layer - Envelope protocol
//!
//! This layer contains:
//! - Envelope value types (SignedEnvelope, VerificationOutcome, SignedRequest)
//! - The shared secret wrapper
//! - Domain services (generator and verifier)

pub mod envelope;
pub mod secret;
pub mod services;
