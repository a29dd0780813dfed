//! Asset classification: decide whether an emitted file is noise and which kind it belongs to.
//!
//! Split into focused submodules so template matching, kind derivation and the combined
//! classifier can be tested independently. Everything here is pure; the classifier carries
//! the compiled templates for one build and nothing else.

mod kind;
mod noise;
mod template;

pub use kind::{asset_kind, camel_case};
pub use noise::{AssetClass, AssetClassifier, NoiseKind};
pub use template::PathTemplate;
