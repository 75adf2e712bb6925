//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Inbound ports describe what the CLI may ask of the application and the
//! infrastructure. Outbound ports describe the upstream data sources the
//! dashboard reads from and the store its preferences persist to. Adapters
//! implement them; the application layer only ever sees the traits.

pub mod inbound;
pub mod outbound;
