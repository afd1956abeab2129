//! Core types and the access engine for the Gatehouse gate-control service.
//!
//! This crate is deliberately free of HTTP and storage dependencies. It holds
//! the credential catalogs, the visit ledger, the emergency channel and the
//! notification outbox, composed into a single [`registry::Gatehouse`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod credential;
pub mod directory;
pub mod emergency;
pub mod error;
pub mod notification;
pub mod registry;
pub mod store;
pub mod visit;

pub use error::{Error, Result};
