//! Multipole library
//!
//! This provides the field models behind the `multipole` binary as a
//! library so orbit integrators and integration tests can use them directly.

pub mod cli;
pub mod config;
pub mod physics;
pub mod prelude;
