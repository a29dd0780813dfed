#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod classify;
pub mod config;
pub mod error;
pub mod hosts;
pub mod manifest;
pub mod models;
pub mod output;
pub mod plugin;

pub use config::{IncludeManifest, ManifestOptions};
pub use error::{BuildError, ConfigError, WriteError};
pub use manifest::{Manifest, ManifestEntry, PathValue, build_manifest};
pub use models::{AssetRef, BuildOutput, BuildStats, EmittedAsset};
pub use output::{DiskFileSystem, MemoryFileSystem, OutputFileSystem, QueuedWriter, WriteOutcome};
pub use plugin::{BuildDiagnostics, ManifestPlugin};
