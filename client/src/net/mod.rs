//! Networking modules for the HyperTrack HTTP API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` owns the HTTP client and bearer token, and `types` defines the
//! shared wire schema.

pub mod api;
pub mod types;
