//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, the composition root, and the operator the
//! CLI drives.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for proxy and dashboard wiring
//! - [`config`] - Configuration loading and validation
//! - [`operator`] - CLI operator interface

pub mod bootstrap;
pub mod config;
pub mod operator;
