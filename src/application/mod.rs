//! Application services (use cases).
//!
//! These services sit between the inbound adapters and the outbound ports:
//! the query layer, the dashboard built on it, and the circuit breakers that
//! guard upstream calls.

pub mod circuit;
pub mod dashboard;
pub mod query;
