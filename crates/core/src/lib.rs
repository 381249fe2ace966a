//! Inventory domain core.
//!
//! Product types, the listing query contract shared by server and client,
//! the typed filter with its matching semantics, and the store trait. This
//! crate performs no I/O so the API, persistence and client crates can all
//! depend on it.

pub mod error;
pub mod filter;
pub mod product;
pub mod store;
pub mod types;
