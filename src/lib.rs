//! Grab Some APIs - a unified dashboard over free public APIs.
//!
//! The crate has two faces. `grabapis serve` runs a backend proxy in front of
//! NASA APOD, the Rick and Morty API and GIPHY, so browsers never see API
//! keys and every upstream sits behind a circuit breaker. Every other
//! command is a dashboard session that reads through a client-side query
//! cache with stale-while-revalidate and cursor pagination, and keeps
//! favorites on disk.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Pure types and validation: APOD dates, filters, cursors,
//!   query keys, the prefetch policy and the API catalog
//! - [`port`] - Traits between the layers
//! - [`application`] - Query cache, dashboard use-cases, circuit breakers
//! - [`adapter`] - CLI and axum proxy (inbound), HTTP clients and the
//!   preference store (outbound)
//! - [`infrastructure`] - Configuration, wiring and the CLI operator
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use grabapis::domain::apod::ApodParams;
//! use chrono::NaiveDate;
//!
//! let params = ApodParams {
//!     date: Some("2024-01-01".into()),
//!     ..ApodParams::default()
//! };
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! assert!(params.validate(today).is_ok());
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
