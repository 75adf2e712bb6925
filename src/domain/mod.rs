//! Pure domain types and rules.
//!
//! Nothing here performs I/O or depends on the async runtime.

pub mod apod;
pub mod catalog;
pub mod character;
pub mod error;
pub mod gif;
pub mod pagination;
pub mod prefetch;
pub mod preferences;
pub mod query_key;
