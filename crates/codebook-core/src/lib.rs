//! Core types and trait definitions for the Codebook annotation store.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the code taxonomy rules (path canonicalisation, prefix walks, subtree
//! matching, rename planning) so every storage backend applies them the same
//! way.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod annotation;
pub mod code;
pub mod error;
pub mod message;
pub mod path;
pub mod store;
pub mod tree;

pub use error::{Error, ErrorKind, Result};
