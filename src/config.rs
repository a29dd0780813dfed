//! Plugin options controlling how the manifest is assembled and where it is written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default manifest file name.
pub const DEFAULT_FILENAME: &str = "webpack-assets.json";

/// Conventional entry name selected by `includeManifest: true`.
pub const DEFAULT_MANIFEST_ENTRY: &str = "manifest";

/// Configuration files searched for by [`ManifestOptions::discover`], in order.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
  "assets-manifest.config.json",
  "assets-manifest.config.yaml",
  "assets-manifest.config.yml",
];

/// Which emitted entry, if any, should have its source inlined into the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IncludeManifest {
  /// `true` selects the conventional `manifest` entry, `false` disables inlining.
  Flag(bool),
  /// Explicit entry name.
  Name(String),
}

impl Default for IncludeManifest {
  fn default() -> Self {
    Self::Flag(false)
  }
}

impl IncludeManifest {
  /// Entry name to inline, resolving `true` to the conventional name.
  pub fn entry_name(&self) -> Option<&str> {
    match self {
      Self::Flag(true) => Some(DEFAULT_MANIFEST_ENTRY),
      Self::Flag(false) => None,
      Self::Name(name) => Some(name.as_str()),
    }
  }
}

/// Options accepted by the manifest plugin.
///
/// Field names follow the camelCase spelling used in configuration files.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestOptions {
  /// Output file name.
  pub filename: String,
  /// Indent the serialized manifest.
  pub pretty_print: bool,
  /// Merge the new manifest over the previously written file.
  pub update: bool,
  /// Prefix asset paths with the resolved public path.
  pub full_path: bool,
  /// Move the inlined manifest entry to the front of the output.
  pub manifest_first: bool,
  /// Write next to the bundler output instead of [`ManifestOptions::path`].
  pub use_compiler_path: bool,
  /// Asset kinds kept when kind filtering is active.
  pub file_types: Vec<String>,
  /// Disable kind filtering entirely.
  pub include_all_file_types: bool,
  /// Keep the manifest in memory instead of writing it to disk.
  pub keep_in_memory: bool,
  /// Record `<kind>Integrity` digests when the bundler provides them.
  pub integrity: bool,
  /// Hosts used to shard asset URLs.
  pub hosts: Vec<String>,
  /// Enumerate entrypoints instead of chunks.
  pub entrypoints: bool,
  /// Entry whose emitted source is inlined as `text`.
  pub include_manifest: IncludeManifest,
  /// Free-form object attached under the `metadata` key.
  pub metadata: Option<serde_json::Value>,
  /// Output directory used when `useCompilerPath` is off.
  pub path: Option<PathBuf>,
  /// Bundler template for hot update chunk file names.
  pub hot_update_chunk_filename: String,
  /// Bundler template for source map file names.
  pub source_map_filename: String,
}

impl Default for ManifestOptions {
  fn default() -> Self {
    Self {
      filename: DEFAULT_FILENAME.into(),
      pretty_print: false,
      update: false,
      full_path: true,
      manifest_first: true,
      use_compiler_path: false,
      file_types: vec!["js".into(), "css".into()],
      include_all_file_types: true,
      keep_in_memory: false,
      integrity: false,
      hosts: Vec::new(),
      entrypoints: false,
      include_manifest: IncludeManifest::default(),
      metadata: None,
      path: None,
      hot_update_chunk_filename: "[id].[fullhash].hot-update.js".into(),
      source_map_filename: "[file].map".into(),
    }
  }
}

impl ManifestOptions {
  /// Look for a configuration file in `dir`, falling back to defaults when none exists.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    for candidate in CONFIG_FILE_CANDIDATES {
      let path = dir.join(candidate);
      if path.is_file() {
        return Self::from_path(&path);
      }
    }
    Ok(Self::default())
  }

  /// Read options from a JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let options: Self = if is_yaml {
      serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
      })?
    } else {
      serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
      })?
    };

    options.validate()?;
    Ok(options)
  }

  /// Reject option combinations the pipeline cannot honour.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.filename.trim().is_empty() {
      return Err(ConfigError::invalid("filename", "must not be empty"));
    }
    if self.filename.contains(['/', '\\']) {
      return Err(ConfigError::invalid(
        "filename",
        format!("`{}` must be a bare file name, use `path` for directories", self.filename),
      ));
    }
    if let Some(index) = self.hosts.iter().position(|host| host.trim().is_empty()) {
      return Err(ConfigError::invalid(
        "hosts",
        format!("host at index {index} is empty"),
      ));
    }
    if let IncludeManifest::Name(name) = &self.include_manifest
      && name.is_empty()
    {
      return Err(ConfigError::invalid(
        "includeManifest",
        "entry name must not be empty, use `false` to disable",
      ));
    }
    if !self.include_all_file_types && self.file_types.is_empty() {
      return Err(ConfigError::invalid(
        "fileTypes",
        "is empty while `includeAllFileTypes` is false, every asset would be dropped",
      ));
    }
    if let Some(metadata) = &self.metadata
      && !metadata.is_object()
    {
      return Err(ConfigError::invalid("metadata", "must be an object"));
    }
    if self.hot_update_chunk_filename.is_empty() {
      return Err(ConfigError::invalid("hotUpdateChunkFilename", "must not be empty"));
    }
    if self.source_map_filename.is_empty() {
      return Err(ConfigError::invalid("sourceMapFilename", "must not be empty"));
    }
    Ok(())
  }

  /// Whether an asset of `kind` survives kind filtering.
  pub fn accepts_kind(&self, kind: &str) -> bool {
    self.include_all_file_types || self.file_types.iter().any(|allowed| allowed == kind)
  }

  /// Directory the manifest is written to.
  ///
  /// `compiler_output` is the bundler's configured output directory, consulted only when
  /// `useCompilerPath` is set. Relative results are anchored at the current directory.
  pub fn resolve_output_dir(&self, compiler_output: Option<&Path>) -> PathBuf {
    let selected = if self.use_compiler_path {
      compiler_output
    } else {
      self.path.as_deref()
    };
    let dir = selected
      .filter(|path| !path.as_os_str().is_empty())
      .unwrap_or_else(|| Path::new("."));

    if dir.is_absolute() {
      dir.to_path_buf()
    } else {
      match std::env::current_dir() {
        Ok(cwd) => cwd.join(dir),
        Err(_) => dir.to_path_buf(),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn defaults_match_documented_values() {
    let options = ManifestOptions::default();
    assert_eq!(options.filename, "webpack-assets.json");
    assert!(!options.pretty_print);
    assert!(options.full_path);
    assert!(options.manifest_first);
    assert!(options.include_all_file_types);
    assert_eq!(options.file_types, vec!["js".to_string(), "css".to_string()]);
    assert!(options.hosts.is_empty());
    assert_eq!(options.include_manifest.entry_name(), None);
    assert!(options.validate().is_ok());
  }

  #[test]
  fn include_manifest_accepts_flag_or_name() {
    let options: ManifestOptions = serde_json::from_str(r#"{"includeManifest": true}"#).unwrap();
    assert_eq!(options.include_manifest.entry_name(), Some("manifest"));

    let options: ManifestOptions =
      serde_json::from_str(r#"{"includeManifest": "runtime"}"#).unwrap();
    assert_eq!(options.include_manifest.entry_name(), Some("runtime"));

    let options: ManifestOptions = serde_json::from_str(r#"{"includeManifest": false}"#).unwrap();
    assert_eq!(options.include_manifest.entry_name(), None);
  }

  #[test]
  fn partial_json_keeps_remaining_defaults() {
    let options: ManifestOptions =
      serde_json::from_str(r#"{"prettyPrint": true, "hosts": ["a.example.com"]}"#).unwrap();
    assert!(options.pretty_print);
    assert_eq!(options.hosts, vec!["a.example.com".to_string()]);
    assert_eq!(options.filename, DEFAULT_FILENAME);
    assert!(options.manifest_first);
  }

  #[test]
  fn rejects_empty_file_types_when_filtering() {
    let options = ManifestOptions {
      include_all_file_types: false,
      file_types: Vec::new(),
      ..ManifestOptions::default()
    };
    let err = options.validate().unwrap_err();
    assert!(err.to_string().contains("fileTypes"));
  }

  #[test]
  fn rejects_blank_hosts_and_nested_filenames() {
    let options = ManifestOptions {
      hosts: vec!["cdn.example.com".into(), " ".into()],
      ..ManifestOptions::default()
    };
    assert!(options.validate().unwrap_err().to_string().contains("index 1"));

    let options = ManifestOptions {
      filename: "out/assets.json".into(),
      ..ManifestOptions::default()
    };
    assert!(options.validate().is_err());
  }

  #[test]
  fn rejects_non_object_metadata() {
    let options = ManifestOptions {
      metadata: Some(serde_json::json!("v1")),
      ..ManifestOptions::default()
    };
    assert!(options.validate().is_err());
  }

  #[test]
  fn kind_filter_respects_include_all_override() {
    let mut options = ManifestOptions {
      file_types: vec!["js".into()],
      ..ManifestOptions::default()
    };
    assert!(options.accepts_kind("png"));

    options.include_all_file_types = false;
    assert!(options.accepts_kind("js"));
    assert!(!options.accepts_kind("png"));
  }

  #[test]
  fn output_dir_prefers_compiler_path_when_enabled() {
    let options = ManifestOptions {
      use_compiler_path: true,
      path: Some(PathBuf::from("/ignored")),
      ..ManifestOptions::default()
    };
    assert_eq!(
      options.resolve_output_dir(Some(Path::new("/srv/dist"))),
      PathBuf::from("/srv/dist")
    );

    let options = ManifestOptions {
      path: Some(PathBuf::from("/srv/manifests")),
      ..ManifestOptions::default()
    };
    assert_eq!(
      options.resolve_output_dir(Some(Path::new("/srv/dist"))),
      PathBuf::from("/srv/manifests")
    );
  }

  #[test]
  fn output_dir_falls_back_to_current_directory() {
    let options = ManifestOptions::default();
    let resolved = options.resolve_output_dir(None);
    assert!(resolved.is_absolute());
    assert_eq!(resolved, std::env::current_dir().unwrap().join("."));
  }

  #[test]
  fn discover_reads_yaml_configuration() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("assets-manifest.config.yaml"),
      "filename: assets.json\nincludeManifest: true\nfileTypes: [js]\nincludeAllFileTypes: false\n",
    )
    .unwrap();

    let options = ManifestOptions::discover(dir.path()).unwrap();
    assert_eq!(options.filename, "assets.json");
    assert_eq!(options.include_manifest.entry_name(), Some("manifest"));
    assert!(!options.accepts_kind("css"));
  }

  #[test]
  fn discover_defaults_without_configuration() {
    let dir = tempdir().unwrap();
    let options = ManifestOptions::discover(dir.path()).unwrap();
    assert_eq!(options.filename, DEFAULT_FILENAME);
  }

  #[test]
  fn from_path_reports_parse_errors_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    let err = ManifestOptions::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Json { .. }));
    assert!(err.to_string().contains("broken.json"));
  }
}
