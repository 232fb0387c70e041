//! Error types for `codex-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The backing key-value slot failed to read or write.
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("not a valid backup document: {0}")]
  InvalidBackup(#[from] BackupRejection),
}

impl Error {
  pub(crate) fn persistence(
    e: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Persistence(Box::new(e))
  }
}

/// Why an externally supplied backup document was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackupRejection {
  #[error("document does not parse: {0}")]
  Malformed(String),

  #[error("document is not an object")]
  NotAnObject,

  #[error("document has no characters array")]
  MissingCharacters,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
