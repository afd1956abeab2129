//! Error type for `gatehouse-store-memory`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] gatehouse_core::Error),

  #[error("failed to read seed file {path:?}: {source}")]
  SeedIo {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed seed file {path:?}: {source}")]
  SeedFormat {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
