//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod preferences;
pub mod upstream;
