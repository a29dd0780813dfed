use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::ManifestOptions;
use crate::error::WriteError;
use crate::manifest::Manifest;
use crate::output::fs::OutputFileSystem;

/// What a single write did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
  /// The file was (re)written.
  Written(PathBuf),
  /// The file already held identical content.
  Unchanged(PathBuf),
  /// Persistence is disabled; the manifest was retained in memory.
  InMemory,
}

/// Formats manifests and persists them at `<output_dir>/<filename>`.
#[derive(Debug)]
pub struct OutputWriter {
  output_dir: PathBuf,
  filename: String,
  pretty_print: bool,
  update: bool,
  keep_in_memory: bool,
  first_entry: Option<String>,
  last_manifest: Mutex<Option<Value>>,
}

impl OutputWriter {
  /// Writer for the given options, targeting `output_dir`.
  pub fn new(options: &ManifestOptions, output_dir: PathBuf) -> Self {
    let first_entry = options
      .manifest_first
      .then(|| options.include_manifest.entry_name().map(str::to_string))
      .flatten();

    Self {
      output_dir,
      filename: options.filename.clone(),
      pretty_print: options.pretty_print,
      update: options.update,
      keep_in_memory: options.keep_in_memory,
      first_entry,
      last_manifest: Mutex::new(None),
    }
  }

  /// Directory the manifest is written to.
  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  /// Full path of the manifest file.
  pub fn output_path(&self) -> PathBuf {
    self.output_dir.join(&self.filename)
  }

  /// Most recent manifest handed to [`OutputWriter::write`], after any merge.
  pub fn last_manifest(&self) -> Option<Value> {
    self
      .last_manifest
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Serialize `value` according to the `prettyPrint` option.
  pub fn render(&self, value: &Value) -> Result<String, WriteError> {
    let text = if self.pretty_print {
      serde_json::to_string_pretty(value)?
    } else {
      serde_json::to_string(value)?
    };
    Ok(text)
  }

  /// Persist `manifest` through `fs`.
  ///
  /// Not reentrant with respect to one target: callers serialize through
  /// [`crate::output::QueuedWriter`].
  pub fn write(
    &self,
    fs: &dyn OutputFileSystem,
    manifest: &Manifest,
  ) -> Result<WriteOutcome, WriteError> {
    let mut value = manifest.to_value()?;

    if self.keep_in_memory {
      if self.update
        && let Some(previous) = self.last_manifest()
      {
        value = self.merge(previous, value);
      }
      self.retain(value);
      debug!("manifest retained in memory");
      return Ok(WriteOutcome::InMemory);
    }

    fs.create_dir_all(&self.output_dir)
      .map_err(|err| WriteError::io("create", &self.output_dir, err))?;
    let path = fs.join(&self.output_dir, &self.filename);

    let existing = match fs.read_to_string(&path) {
      Ok(text) => Some(text),
      Err(err) if err.kind() == ErrorKind::NotFound => None,
      Err(err) => return Err(WriteError::io("read", &path, err)),
    };

    if self.update
      && let Some(previous) = existing.as_deref().and_then(|text| parse_previous(&path, text))
    {
      value = self.merge(previous, value);
    }

    let text = self.render(&value)?;
    self.retain(value);

    if existing.as_deref() == Some(text.as_str()) {
      debug!(path = %path.display(), "manifest unchanged");
      return Ok(WriteOutcome::Unchanged(path));
    }

    fs.write(&path, &text)
      .map_err(|err| WriteError::io("write", &path, err))?;
    info!(path = %path.display(), "wrote asset manifest");
    Ok(WriteOutcome::Written(path))
  }

  fn retain(&self, value: Value) {
    *self
      .last_manifest
      .lock()
      .unwrap_or_else(PoisonError::into_inner) = Some(value);
  }

  /// Overlay `next` on `previous` key by key, keeping the position of keys that already existed.
  fn merge(&self, previous: Value, next: Value) -> Value {
    match (previous, next) {
      (Value::Object(mut merged), Value::Object(next)) => {
        for (key, value) in next {
          merged.insert(key, value);
        }
        Value::Object(self.reorder(merged))
      }
      (_, next) => next,
    }
  }

  fn reorder(&self, map: Map<String, Value>) -> Map<String, Value> {
    let Some(first) = self.first_entry.as_deref() else {
      return map;
    };
    if !map.contains_key(first) {
      return map;
    }

    let mut ordered = Map::with_capacity(map.len());
    let mut rest = Vec::with_capacity(map.len());
    for (key, value) in map {
      if key == first {
        ordered.insert(key, value);
      } else {
        rest.push((key, value));
      }
    }
    ordered.extend(rest);
    ordered
  }
}

fn parse_previous(path: &Path, text: &str) -> Option<Value> {
  match serde_json::from_str::<Value>(text) {
    Ok(value) if value.is_object() => Some(value),
    Ok(_) => {
      warn!(path = %path.display(), "previous manifest is not an object, replacing it");
      None
    }
    Err(err) => {
      warn!(path = %path.display(), error = %err, "previous manifest is not valid JSON, replacing it");
      None
    }
  }
}
