//! Outbound adapters: HTTP clients for the upstream APIs and the proxy, and
//! preference storage.

pub mod backend;
pub mod catalog;
pub mod giphy;
pub mod http;
pub mod nasa;
pub mod preferences;
pub mod rickandmorty;
