//! Client-side query layer: a keyed cache with stale-while-revalidate,
//! in-flight de-duplication, observer-pinned garbage collection and
//! cursor-driven infinite queries.

pub mod cache;
pub mod client;
pub mod infinite;
pub mod policy;
