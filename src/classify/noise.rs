use crate::classify::kind::asset_kind;
use crate::classify::template::PathTemplate;
use crate::config::ManifestOptions;
use crate::error::ConfigError;

/// Why a file is excluded from the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseKind {
  /// Hot module replacement fragment.
  HotUpdate,
  /// Source map.
  SourceMap,
}

/// Result of classifying one emitted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetClass {
  /// File never appears in the manifest.
  Noise(NoiseKind),
  /// File belongs under the given kind.
  Kind(String),
}

/// Classifier bound to the filename templates and hash of one build.
#[derive(Debug, Clone)]
pub struct AssetClassifier {
  hot_update: PathTemplate,
  source_map: PathTemplate,
}

impl AssetClassifier {
  /// Compile the classifier for a build with the given hash.
  pub fn new(options: &ManifestOptions, build_hash: Option<&str>) -> Result<Self, ConfigError> {
    let hot_update = PathTemplate::compile(&options.hot_update_chunk_filename, build_hash)
      .map_err(|err| ConfigError::invalid("hotUpdateChunkFilename", err.to_string()))?;
    let source_map = PathTemplate::compile(&options.source_map_filename, build_hash)
      .map_err(|err| ConfigError::invalid("sourceMapFilename", err.to_string()))?;

    Ok(Self {
      hot_update,
      source_map,
    })
  }

  /// Classify `file_name` as noise or as a kind.
  pub fn classify(&self, file_name: &str) -> AssetClass {
    if self.is_hot_update(file_name) {
      return AssetClass::Noise(NoiseKind::HotUpdate);
    }
    if self.is_source_map(file_name) {
      return AssetClass::Noise(NoiseKind::SourceMap);
    }
    AssetClass::Kind(asset_kind(file_name))
  }

  /// Whether `file_name` is a hot update fragment of this build.
  pub fn is_hot_update(&self, file_name: &str) -> bool {
    self.hot_update.matches(file_name)
  }

  /// Whether `file_name` is a source map.
  pub fn is_source_map(&self, file_name: &str) -> bool {
    let path = file_name.split(['?', '#']).next().unwrap_or(file_name);
    path.ends_with(".map") || self.source_map.matches(file_name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn classifier(hash: Option<&str>) -> AssetClassifier {
    AssetClassifier::new(&ManifestOptions::default(), hash).unwrap()
  }

  #[test]
  fn flags_hot_update_fragments() {
    let classifier = classifier(Some("abc123"));
    assert_eq!(
      classifier.classify("main.abc123.hot-update.js"),
      AssetClass::Noise(NoiseKind::HotUpdate)
    );
    assert_eq!(
      classifier.classify("main.abc123.js"),
      AssetClass::Kind("js".into())
    );
  }

  #[test]
  fn flags_source_maps_by_suffix_and_template() {
    let classifier = classifier(None);
    assert_eq!(
      classifier.classify("vendor-xyz.js.map"),
      AssetClass::Noise(NoiseKind::SourceMap)
    );
    assert_eq!(
      classifier.classify("app.css.map?v=2"),
      AssetClass::Noise(NoiseKind::SourceMap)
    );
    assert_eq!(
      classifier.classify("app.js.map#x"),
      AssetClass::Noise(NoiseKind::SourceMap)
    );

    let options = ManifestOptions {
      source_map_filename: "sourcemaps/[file].smap".into(),
      ..ManifestOptions::default()
    };
    let custom = AssetClassifier::new(&options, None).unwrap();
    assert!(custom.is_source_map("sourcemaps/app.js.smap"));
    assert!(!custom.is_source_map("app.js"));
  }

  #[test]
  fn other_files_are_kinds() {
    let classifier = classifier(Some("abc123"));
    assert_eq!(classifier.classify("logo.png"), AssetClass::Kind("png".into()));
    assert_eq!(classifier.classify("site.css"), AssetClass::Kind("css".into()));
  }
}
