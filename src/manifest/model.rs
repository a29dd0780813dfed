//! Typed manifest structure: entry name to kind to path or paths.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Reserved top-level key holding the configured metadata block.
pub const METADATA_KEY: &str = "metadata";

/// Key holding inlined manifest source on an entry.
pub const TEXT_KEY: &str = "text";

/// Suffix appended to a kind for its integrity digest key.
pub const INTEGRITY_SUFFIX: &str = "Integrity";

/// One path, or several once a second asset of the same kind shows up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathValue {
  /// Exactly one asset of this kind.
  Scalar(String),
  /// Two or more assets of this kind, in discovery order.
  List(Vec<String>),
}

impl PathValue {
  /// Append `path`, promoting a scalar to a list.
  pub fn push(&mut self, path: String) {
    match self {
      Self::Scalar(existing) => {
        let first = std::mem::take(existing);
        *self = Self::List(vec![first, path]);
      }
      Self::List(paths) => paths.push(path),
    }
  }

  /// Most recently recorded path.
  pub fn last(&self) -> &str {
    match self {
      Self::Scalar(path) => path,
      Self::List(paths) => paths.last().map_or("", String::as_str),
    }
  }

  /// Recorded paths in order.
  pub fn paths(&self) -> Vec<&str> {
    match self {
      Self::Scalar(path) => vec![path.as_str()],
      Self::List(paths) => paths.iter().map(String::as_str).collect(),
    }
  }
}

/// A single key of a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryField {
  /// Paths recorded for a kind.
  Paths {
    /// Asset kind, e.g. `js`.
    kind: String,
    /// Path or paths of that kind.
    paths: PathValue,
  },
  /// Integrity digest of the first asset recorded for a kind.
  Integrity {
    /// Asset kind the digest belongs to.
    kind: String,
    /// Subresource integrity digest.
    digest: String,
  },
  /// Inlined source of the manifest entry.
  Text(String),
}

impl EntryField {
  /// Key this field serializes under.
  fn key(&self) -> String {
    match self {
      Self::Paths { kind, .. } => kind.clone(),
      Self::Integrity { kind, .. } => format!("{kind}{INTEGRITY_SUFFIX}"),
      Self::Text(_) => TEXT_KEY.to_string(),
    }
  }
}

/// Assets of one entry grouped by kind, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestEntry {
  fields: Vec<EntryField>,
}

impl ManifestEntry {
  /// Record `path` under `kind`. Returns `true` when this is the first path of that kind.
  pub fn record(&mut self, kind: &str, path: String) -> bool {
    for field in &mut self.fields {
      if let EntryField::Paths { kind: existing, paths } = field
        && existing == kind
      {
        paths.push(path);
        return false;
      }
    }

    self.fields.push(EntryField::Paths {
      kind: kind.to_string(),
      paths: PathValue::Scalar(path),
    });
    true
  }

  /// Store the integrity digest for `kind`, replacing any previous digest.
  pub fn set_integrity(&mut self, kind: &str, digest: String) {
    for field in &mut self.fields {
      if let EntryField::Integrity { kind: existing, digest: current } = field
        && existing == kind
      {
        *current = digest;
        return;
      }
    }
    self.fields.push(EntryField::Integrity {
      kind: kind.to_string(),
      digest,
    });
  }

  /// Attach inlined source text.
  pub fn set_text(&mut self, text: String) {
    for field in &mut self.fields {
      if let EntryField::Text(current) = field {
        *current = text;
        return;
      }
    }
    self.fields.push(EntryField::Text(text));
  }

  /// Paths recorded for `kind`.
  pub fn paths(&self, kind: &str) -> Option<&PathValue> {
    self.fields.iter().find_map(|field| match field {
      EntryField::Paths { kind: existing, paths } if existing == kind => Some(paths),
      _ => None,
    })
  }

  /// Integrity digest recorded for `kind`.
  pub fn integrity(&self, kind: &str) -> Option<&str> {
    self.fields.iter().find_map(|field| match field {
      EntryField::Integrity { kind: existing, digest } if existing == kind => Some(digest.as_str()),
      _ => None,
    })
  }

  /// Inlined manifest source, if any.
  pub fn text(&self) -> Option<&str> {
    self.fields.iter().find_map(|field| match field {
      EntryField::Text(text) => Some(text.as_str()),
      _ => None,
    })
  }

  /// Whether nothing has been recorded.
  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }
}

impl Serialize for ManifestEntry {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.fields.len()))?;
    for field in &self.fields {
      match field {
        EntryField::Paths { kind, paths } => map.serialize_entry(kind, paths)?,
        EntryField::Integrity { digest, .. } => map.serialize_entry(&field.key(), digest)?,
        EntryField::Text(text) => map.serialize_entry(TEXT_KEY, text)?,
      }
    }
    map.end()
  }
}

/// Complete manifest for one build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
  entries: Vec<(String, ManifestEntry)>,
  metadata: Option<serde_json::Value>,
}

impl Manifest {
  /// Append an entry, replacing an existing entry with the same name in place.
  pub fn insert(&mut self, name: impl Into<String>, entry: ManifestEntry) {
    let name = name.into();
    match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
      Some((_, slot)) => *slot = entry,
      None => self.entries.push((name, entry)),
    }
  }

  /// Remove an entry by name.
  pub fn remove(&mut self, name: &str) -> Option<ManifestEntry> {
    let index = self.entries.iter().position(|(existing, _)| existing == name)?;
    Some(self.entries.remove(index).1)
  }

  /// Entry by name.
  pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
    self
      .entries
      .iter()
      .find_map(|(existing, entry)| (existing == name).then_some(entry))
  }

  /// Mutable entry by name.
  pub fn get_mut(&mut self, name: &str) -> Option<&mut ManifestEntry> {
    self
      .entries
      .iter_mut()
      .find_map(|(existing, entry)| (existing == name).then_some(entry))
  }

  /// Entry names in output order.
  pub fn entry_names(&self) -> Vec<&str> {
    self.entries.iter().map(|(name, _)| name.as_str()).collect()
  }

  /// Move `name` to the first position. Returns `false` when there is no such entry.
  pub fn move_to_front(&mut self, name: &str) -> bool {
    match self.entries.iter().position(|(existing, _)| existing == name) {
      Some(index) => {
        let entry = self.entries.remove(index);
        self.entries.insert(0, entry);
        true
      }
      None => false,
    }
  }

  /// Attach the metadata block.
  pub fn set_metadata(&mut self, metadata: serde_json::Value) {
    self.metadata = Some(metadata);
  }

  /// Whether the manifest holds no entries and no metadata.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty() && self.metadata.is_none()
  }

  /// Convert into an ordered JSON value.
  pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(self)
  }
}

impl Serialize for Manifest {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let len = self.entries.len() + usize::from(self.metadata.is_some());
    let mut map = serializer.serialize_map(Some(len))?;
    for (name, entry) in &self.entries {
      map.serialize_entry(name, entry)?;
    }
    if let Some(metadata) = &self.metadata {
      map.serialize_entry(METADATA_KEY, metadata)?;
    }
    map.end()
  }
}
