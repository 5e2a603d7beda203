//! Core types and trait definitions for the toolboard catalog service.
//!
//! This crate is deliberately free of HTTP and file-format dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod error;
pub mod filter;
pub mod identity;
pub mod ledger;
pub mod source;
pub mod tool;
pub mod vote;

pub use error::{Error, Result};
