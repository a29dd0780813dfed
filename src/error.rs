//! Error types shared across the manifest pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Invalid or unreadable plugin configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read a configuration file from disk.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse a JSON configuration file.
  #[error("failed to parse {}: {source}", path.display())]
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// Failed to parse a YAML configuration file.
  #[error("failed to parse {}: {source}", path.display())]
  Yaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_yaml::Error,
  },
  /// An option holds a value the pipeline cannot work with.
  #[error("invalid option `{option}`: {message}")]
  Invalid {
    /// Name of the offending option as written in configuration.
    option: &'static str,
    /// Human readable explanation.
    message: String,
  },
}

impl ConfigError {
  pub(crate) fn invalid(option: &'static str, message: impl Into<String>) -> Self {
    Self::Invalid {
      option,
      message: message.into(),
    }
  }
}

/// Fatal failures while assembling a manifest.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The configured manifest entry points at an asset whose source is unavailable.
  #[error("could not locate manifest source for entry `{entry}` (asset `{asset}`)")]
  ManifestInlineMissing {
    /// Manifest entry name that was selected for inlining.
    entry: String,
    /// Emitted asset name the entry resolved to.
    asset: String,
  },
  /// The configured manifest entry has no script asset to inline.
  #[error("manifest entry `{entry}` has no `js` asset to inline")]
  ManifestScriptMissing {
    /// Manifest entry name that was selected for inlining.
    entry: String,
  },
  /// Options could not be applied to this build.
  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// Recoverable failure while persisting a manifest.
///
/// Cloneable so a single coalesced write can report its outcome to every waiter.
#[derive(Debug, Clone, Error)]
pub enum WriteError {
  /// Filesystem operation failed.
  #[error("failed to {action} {}: {source}", path.display())]
  Io {
    /// Operation that was attempted.
    action: &'static str,
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: Arc<std::io::Error>,
  },
  /// Manifest could not be serialized.
  #[error("failed to serialize manifest: {0}")]
  Serialize(Arc<serde_json::Error>),
  /// The coordinator went away before reporting a result.
  #[error("manifest writer stopped before completing the write")]
  Disconnected,
}

impl WriteError {
  pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      action,
      path: path.into(),
      source: Arc::new(source),
    }
  }
}

impl From<serde_json::Error> for WriteError {
  fn from(err: serde_json::Error) -> Self {
    Self::Serialize(Arc::new(err))
  }
}
