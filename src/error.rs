//! Error types shared by the resolution engine.

use thiserror::Error;

/// Reasons a virtual path cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
  /// The input was empty or contained only whitespace.
  #[error("virtual path must not be empty")]
  Empty,
  /// The input tried to navigate above the virtual root.
  #[error("virtual path `{0}` navigates above the root")]
  Traversal(String),
}

/// Failure while reading build metadata shipped inside a module.
#[derive(Debug, Error)]
pub enum MetadataError {
  /// The embedded JSON could not be parsed.
  #[error("failed to parse build metadata for module `{module}`: {source}")]
  Parse {
    /// Module that carried the metadata.
    module: String,
    /// Underlying JSON error.
    #[source]
    source: serde_json::Error,
  },
}
