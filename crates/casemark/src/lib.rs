//! casemark - derive test fixtures from marker-annotated sources.
//!
//! The binary wires config loading, directory walking, and rendering
//! around [`casemark_core`]; the modules live in this library so
//! integration tests can exercise them directly.

pub mod config;
pub mod output;
