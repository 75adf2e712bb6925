//! Inbound ports: what the CLI and other driving adapters may ask for.

pub mod dashboard;
pub mod operator;
