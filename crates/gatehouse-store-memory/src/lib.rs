//! In-memory backend for the Gatehouse registry.
//!
//! Holds the one [`Gatehouse`](gatehouse_core::registry::Gatehouse) instance
//! behind an async mutex, so every operation (including the read-modify-write
//! ones) runs atomically with respect to concurrent requests. Nothing is
//! persisted; a restart resets to the seed.

mod seed;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use seed::load_seed;
pub use store::MemoryStore;
