//! CLI module graph.

pub mod apod;
pub mod catalog;
pub mod characters;
pub mod check;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod favorites;
pub mod gifs;
pub mod operator;
pub mod output;
pub mod paths;
pub mod serve;
pub mod session;
