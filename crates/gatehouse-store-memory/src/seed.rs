//! Startup seed: a JSON document with the read-only catalogs.
//!
//! ```json
//! { "units": [], "profiles": [], "workers": [], "authorizations": [],
//!   "invitations": [], "visits": [] }
//! ```
//!
//! Every key is optional.

use std::path::Path;

use gatehouse_core::registry::Bootstrap;

use crate::{Error, Result};

/// Read and parse the seed at `path`.
pub async fn load_seed(path: impl AsRef<Path>) -> Result<Bootstrap> {
  let path = path.as_ref();
  let raw = tokio::fs::read(path).await.map_err(|source| Error::SeedIo {
    path: path.to_path_buf(),
    source,
  })?;
  let seed: Bootstrap =
    serde_json::from_slice(&raw).map_err(|source| Error::SeedFormat {
      path: path.to_path_buf(),
      source,
    })?;

  tracing::info!(
    units = seed.units.len(),
    profiles = seed.profiles.len(),
    workers = seed.workers.len(),
    authorizations = seed.authorizations.len(),
    invitations = seed.invitations.len(),
    visits = seed.visits.len(),
    "seed loaded from {path:?}"
  );
  Ok(seed)
}
