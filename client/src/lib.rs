//! HyperTrack client core.
//!
//! ARCHITECTURE
//! ============
//! Headless pieces a front end wires together:
//!
//! - `session`: session manager over an `identity` provider.
//! - `navigation` / `route`: the navigation stack and typed route segments.
//! - `guard`: route guard that keeps the screen consistent with the session.
//! - `records`, `assistant`, `quiz`: screen logic, each scoped by an
//!   explicitly passed `Session`.
//! - `net`: HTTP transport and wire types.

pub mod assistant;
pub mod events;
pub mod guard;
pub mod identity;
pub mod navigation;
pub mod net;
pub mod quiz;
pub mod records;
pub mod route;
pub mod session;
pub mod token_store;
