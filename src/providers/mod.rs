//! Providers Module - External Services
//!
//! The vision model client and the trait the core talks to.

pub mod gemini;

pub use gemini::*;
