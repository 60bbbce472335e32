//! Error types for `guichet-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("diff is not a JSON object")]
  DiffNotObject,

  #[error("diff entry for `{0}` is not a [before, after] pair")]
  MalformedDiffEntry(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
