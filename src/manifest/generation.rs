//! Assemble the manifest from a finished build's output description.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::classify::{AssetClass, AssetClassifier};
use crate::config::ManifestOptions;
use crate::error::BuildError;
use crate::hosts::host_prefix;
use crate::manifest::inline::inline_manifest_source;
use crate::manifest::model::{METADATA_KEY, Manifest, ManifestEntry};
use crate::models::{AssetRef, BuildOutput};

/// Name of the synthetic bucket holding assets no named chunk claimed.
pub const UNNAMED_ENTRY: &str = "";

/// Build the manifest for one finished build.
pub fn build_manifest(output: &BuildOutput, options: &ManifestOptions) -> Result<Manifest, BuildError> {
  let stats = &output.stats;
  let classifier = AssetClassifier::new(options, stats.hash.as_deref())?;
  let base_path = asset_base_path(options, stats.public_path.as_deref());

  let mut manifest = Manifest::default();
  let mut seen_assets: HashSet<&str> = HashSet::new();

  for (entry_name, assets) in entry_sources(output, options) {
    let is_unnamed = entry_name == UNNAMED_ENTRY;
    let mut entry = ManifestEntry::default();

    for asset in assets {
      let file_name = asset.name();
      let kind = match classifier.classify(file_name) {
        AssetClass::Noise(noise) => {
          debug!(asset = file_name, ?noise, "skipping noise asset");
          continue;
        }
        AssetClass::Kind(kind) => kind,
      };
      if is_unnamed && seen_assets.contains(file_name) {
        continue;
      }
      if !options.accepts_kind(&kind) {
        debug!(asset = file_name, kind = %kind, "asset kind not in fileTypes");
        continue;
      }

      let path = format!(
        "{}{}",
        host_prefix(file_name, &options.hosts),
        join_asset_path(base_path, file_name)
      );
      let first_of_kind = entry.record(&kind, path);

      if first_of_kind
        && options.integrity
        && let Some(digest) = output.integrity(file_name)
      {
        entry.set_integrity(&kind, digest.to_string());
      }
      seen_assets.insert(file_name);
    }

    if entry.is_empty() {
      debug!(entry = entry_name, "entry produced no assets");
      continue;
    }
    manifest.insert(entry_name, entry);
  }

  if let Some(entry_name) = options.include_manifest.entry_name() {
    inline_manifest_source(&mut manifest, output, entry_name, base_path, &options.hosts)?;
  }

  if let Some(metadata) = &options.metadata {
    if manifest.remove(METADATA_KEY).is_some() {
      warn!("entry `{METADATA_KEY}` is shadowed by the configured metadata block");
    }
    manifest.set_metadata(metadata.clone());
  }

  if options.manifest_first
    && let Some(entry_name) = options.include_manifest.entry_name()
  {
    manifest.move_to_front(entry_name);
  }

  Ok(manifest)
}

/// Base prepended to every asset path.
pub fn asset_base_path<'a>(options: &ManifestOptions, public_path: Option<&'a str>) -> &'a str {
  match public_path {
    Some(public_path) if options.full_path => public_path,
    _ => "",
  }
}

/// Join `base` and `file_name` with exactly one `/` between them.
pub fn join_asset_path(base: &str, file_name: &str) -> String {
  if base.is_empty() || base.ends_with('/') {
    format!("{base}{file_name}")
  } else {
    format!("{base}/{file_name}")
  }
}

/// Entry names with their assets, in discovery order.
///
/// Chunk mode appends the unnamed bucket holding every emitted asset.
fn entry_sources<'a>(output: &'a BuildOutput, options: &ManifestOptions) -> Vec<(&'a str, &'a [AssetRef])> {
  let stats = &output.stats;

  if options.entrypoints {
    if stats.entrypoints.is_empty() {
      warn!("entrypoints mode is enabled but the build reported no entrypoints");
    }
    return stats
      .entrypoints
      .iter()
      .map(|(name, entry)| (name.as_str(), entry.assets.as_slice()))
      .collect();
  }

  stats
    .assets_by_chunk_name
    .iter()
    .filter(|(name, _)| !name.is_empty())
    .map(|(name, assets)| (name.as_str(), assets.as_slice()))
    .chain(std::iter::once((UNNAMED_ENTRY, stats.assets.as_slice())))
    .collect()
}
