//! Bundler output description consumed by the manifest builder.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Reference to an emitted asset as reported in the stats object.
///
/// Bundlers report either the bare file name or an object carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AssetRef {
  /// Bare file name.
  Name(String),
  /// Asset object; other stats fields are ignored.
  Object {
    /// Emitted file name.
    name: String,
    /// Subresource integrity digest, when the bundler computed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    integrity: Option<String>,
  },
}

impl AssetRef {
  /// Emitted file name of the referenced asset.
  pub fn name(&self) -> &str {
    match self {
      Self::Name(name) => name,
      Self::Object { name, .. } => name,
    }
  }

  /// Integrity digest carried by the stats entry.
  pub fn integrity(&self) -> Option<&str> {
    match self {
      Self::Name(_) => None,
      Self::Object { integrity, .. } => integrity.as_deref(),
    }
  }
}

impl From<&str> for AssetRef {
  fn from(name: &str) -> Self {
    Self::Name(name.to_string())
  }
}

/// A single asset or a list of assets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
  /// Lone asset reference.
  One(AssetRef),
  /// Ordered asset references.
  Many(Vec<AssetRef>),
}

impl OneOrMany {
  /// Normalise into an ordered list of references.
  pub fn as_slice(&self) -> &[AssetRef] {
    match self {
      Self::One(asset) => std::slice::from_ref(asset),
      Self::Many(assets) => assets,
    }
  }
}

impl From<Vec<&str>> for OneOrMany {
  fn from(names: Vec<&str>) -> Self {
    Self::Many(names.into_iter().map(AssetRef::from).collect())
  }
}

impl From<&str> for OneOrMany {
  fn from(name: &str) -> Self {
    Self::One(AssetRef::from(name))
  }
}

/// Assets belonging to one entrypoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntrypointStats {
  /// Assets emitted for the entrypoint, in load order.
  #[serde(default)]
  pub assets: Vec<AssetRef>,
}

/// Subset of the bundler's JSON stats the manifest is built from.
///
/// Map-shaped fields keep the order in which the bundler listed them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildStats {
  /// Compilation hash.
  pub hash: Option<String>,
  /// Public path with placeholders already resolved.
  pub public_path: Option<String>,
  /// Chunk name to emitted files.
  #[serde(deserialize_with = "ordered_pairs")]
  pub assets_by_chunk_name: Vec<(String, OneOrMany)>,
  /// Every emitted asset, used for the unnamed bucket.
  pub assets: Vec<AssetRef>,
  /// Entrypoint name to its assets.
  #[serde(deserialize_with = "ordered_pairs")]
  pub entrypoints: Vec<(String, EntrypointStats)>,
  /// Bundler output directory, if reported.
  pub output_path: Option<String>,
}

impl BuildStats {
  /// Every asset reference: chunks first, then the asset list, then entrypoints.
  fn asset_refs(&self) -> impl Iterator<Item = &AssetRef> {
    let chunk_assets = self
      .assets_by_chunk_name
      .iter()
      .flat_map(|(_, assets)| assets.as_slice());
    let entry_assets = self.entrypoints.iter().flat_map(|(_, entry)| entry.assets.iter());
    chunk_assets.chain(self.assets.iter()).chain(entry_assets)
  }
}

/// Emitted-file details looked up by asset name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmittedAsset {
  /// Subresource integrity digest, e.g. `sha384-...`.
  pub integrity: Option<String>,
  /// Emitted source text.
  pub source: Option<String>,
}

/// Everything the builder needs to know about one finished build.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
  /// Stats reported by the bundler.
  pub stats: BuildStats,
  /// Emitted-file details keyed by asset name.
  pub assets: BTreeMap<String, EmittedAsset>,
}

impl BuildOutput {
  /// Wrap stats, seeding integrity digests reported on asset objects.
  pub fn new(stats: BuildStats) -> Self {
    let mut assets: BTreeMap<String, EmittedAsset> = BTreeMap::new();
    for asset in stats.asset_refs() {
      if let Some(integrity) = asset.integrity() {
        assets
          .entry(asset.name().to_string())
          .or_default()
          .integrity
          .get_or_insert_with(|| integrity.to_string());
      }
    }
    Self { stats, assets }
  }

  /// Attach details for an emitted asset.
  pub fn with_asset(mut self, name: impl Into<String>, asset: EmittedAsset) -> Self {
    self.assets.insert(name.into(), asset);
    self
  }

  /// Integrity digest recorded for `name`.
  pub fn integrity(&self, name: &str) -> Option<&str> {
    self.assets.get(name)?.integrity.as_deref()
  }

  /// Source text recorded for `name`.
  pub fn source(&self, name: &str) -> Option<&str> {
    self.assets.get(name)?.source.as_deref()
  }

  /// Every asset name referenced anywhere in the stats, first occurrence order.
  pub fn referenced_asset_names(&self) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    self
      .stats
      .asset_refs()
      .map(AssetRef::name)
      .filter(|name| seen.insert(name.to_string()))
      .map(str::to_string)
      .collect()
  }
}

/// Deserialize a JSON object into `(key, value)` pairs, preserving document order.
fn ordered_pairs<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  struct PairsVisitor<T>(PhantomData<T>);

  impl<'de, T: Deserialize<'de>> Visitor<'de> for PairsVisitor<T> {
    type Value = Vec<(String, T)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
      let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
      while let Some((key, value)) = map.next_entry::<String, T>()? {
        pairs.push((key, value));
      }
      Ok(pairs)
    }
  }

  deserializer.deserialize_map(PairsVisitor(PhantomData))
}
