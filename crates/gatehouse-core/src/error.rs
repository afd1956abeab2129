//! Error types for `gatehouse-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a forced entry requires a non-empty justification")]
  MissingForcedReason,

  #[error("invalid validity window: {from} is after {to}")]
  InvalidWindow { from: String, to: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
