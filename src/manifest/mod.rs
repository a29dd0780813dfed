//! Manifest assembly broken into focused submodules for easier testing.

mod generation;
mod inline;
mod model;

pub use generation::{UNNAMED_ENTRY, asset_base_path, build_manifest, join_asset_path};
pub use inline::{emitted_asset_name, inline_manifest_source};
pub use model::{
  INTEGRITY_SUFFIX, METADATA_KEY, Manifest, ManifestEntry, PathValue, TEXT_KEY,
};
