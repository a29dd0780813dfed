//! Build-completion hook: assemble the manifest and hand it to the write queue.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::config::ManifestOptions;
use crate::error::{BuildError, ConfigError, WriteError};
use crate::manifest::{Manifest, build_manifest};
use crate::models::BuildOutput;
use crate::output::{OutputWriter, QueuedWriter, SharedFileSystem, WriteTicket};

/// Non-fatal errors reported back to the build pipeline.
///
/// Cloned handles share the same list, so completion callbacks can report into it.
#[derive(Debug, Clone, Default)]
pub struct BuildDiagnostics {
  errors: Arc<Mutex<Vec<WriteError>>>,
}

impl BuildDiagnostics {
  /// Empty diagnostics.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a write failure.
  pub fn push(&self, error: WriteError) {
    self
      .errors
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(error);
  }

  /// Errors recorded so far.
  pub fn errors(&self) -> Vec<WriteError> {
    self
      .errors
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Whether nothing went wrong.
  pub fn is_empty(&self) -> bool {
    self
      .errors
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .is_empty()
  }
}

/// Manifest generator attached to a bundler's build lifecycle.
pub struct ManifestPlugin {
  options: ManifestOptions,
  writer: QueuedWriter,
}

impl ManifestPlugin {
  /// Validate `options` and bind the output location.
  ///
  /// `compiler_output` is the bundler's output directory, used when `useCompilerPath` is set.
  pub fn new(options: ManifestOptions, compiler_output: Option<&Path>) -> Result<Self, ConfigError> {
    options.validate()?;
    let output_dir = options.resolve_output_dir(compiler_output);
    debug!(dir = %output_dir.display(), "manifest output directory");
    let writer = QueuedWriter::new(OutputWriter::new(&options, output_dir));
    Ok(Self { options, writer })
  }

  /// Effective options.
  pub fn options(&self) -> &ManifestOptions {
    &self.options
  }

  /// Where the manifest file is written.
  pub fn output_path(&self) -> PathBuf {
    self.writer.writer().output_path()
  }

  /// Last manifest handed to the writer; the only copy when `keepInMemory` is set.
  pub fn last_manifest(&self) -> Option<serde_json::Value> {
    self.writer.writer().last_manifest()
  }

  /// Assemble the manifest without writing it.
  pub fn build(&self, output: &BuildOutput) -> Result<Manifest, BuildError> {
    build_manifest(output, &self.options)
  }

  /// Assemble the manifest and queue it for writing.
  pub fn emit(&self, output: &BuildOutput, fs: SharedFileSystem) -> Result<WriteTicket, BuildError> {
    let manifest = self.build(output)?;
    Ok(self.writer.enqueue(fs, manifest))
  }

  /// Hook for the bundler's after-emit stage.
  ///
  /// Build failures are returned directly. Write failures are pushed onto `diagnostics`;
  /// `done` runs once the covering write has finished either way.
  pub fn after_emit<F>(
    &self,
    output: &BuildOutput,
    fs: SharedFileSystem,
    diagnostics: &BuildDiagnostics,
    done: F,
  ) -> Result<(), BuildError>
  where
    F: FnOnce() + Send + 'static,
  {
    let manifest = self.build(output)?;
    let diagnostics = diagnostics.clone();
    self.writer.enqueue_with(fs, manifest, move |result| {
      if let Err(err) = result {
        warn!(error = %err, "asset manifest was not written");
        diagnostics.push(err);
      }
      done();
    });
    Ok(())
  }

  /// Block until every queued write has finished.
  pub fn wait_idle(&self) {
    self.writer.wait_idle();
  }
}
