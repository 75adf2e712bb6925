//! Backend proxy: an axum service in front of the upstream APIs.

pub mod catalog;
pub mod error;
pub mod giphy;
pub mod health;
pub mod monitoring;
pub mod nasa;
pub mod rickandmorty;
pub mod router;
pub mod state;
