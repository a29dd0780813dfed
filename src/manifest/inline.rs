//! Inline the emitted source of the manifest entry into the manifest itself.

use tracing::debug;

use crate::error::BuildError;
use crate::hosts::host_prefix;
use crate::manifest::model::Manifest;
use crate::models::BuildOutput;

/// Attach the source of `entry_name`'s last script as its `text` field.
///
/// Absent entries are skipped. A present entry without a script, or whose script source is
/// unavailable or empty, is a broken build.
pub fn inline_manifest_source(
  manifest: &mut Manifest,
  output: &BuildOutput,
  entry_name: &str,
  base_path: &str,
  hosts: &[String],
) -> Result<(), BuildError> {
  let Some(entry) = manifest.get_mut(entry_name) else {
    debug!(entry = entry_name, "manifest entry not emitted, nothing to inline");
    return Ok(());
  };

  let script = entry
    .paths("js")
    .ok_or_else(|| BuildError::ManifestScriptMissing {
      entry: entry_name.to_string(),
    })?
    .last();
  let asset = emitted_asset_name(script, base_path, hosts);

  let text = output
    .source(&asset)
    .filter(|text| !text.is_empty())
    .ok_or_else(|| BuildError::ManifestInlineMissing {
      entry: entry_name.to_string(),
      asset: asset.clone(),
    })?
    .to_string();

  entry.set_text(text);
  Ok(())
}

/// Recover the emitted file name from a manifest path by removing host and base prefixes.
///
/// A host is only stripped when the remaining name shards back onto that same host, so
/// hosts that prefix one another resolve to the right one.
pub fn emitted_asset_name(path: &str, base_path: &str, hosts: &[String]) -> String {
  let Some(hostless) = path.strip_prefix("//") else {
    return strip_base(path, base_path).to_string();
  };

  hosts
    .iter()
    .find_map(|host| {
      let name = strip_base(hostless.strip_prefix(host.as_str())?, base_path);
      (host_prefix(name, hosts) == format!("//{host}")).then(|| name.to_string())
    })
    .unwrap_or_else(|| strip_base(path, base_path).to_string())
}

fn strip_base<'a>(path: &'a str, base_path: &str) -> &'a str {
  match path.strip_prefix(base_path) {
    Some(rest) if !base_path.is_empty() && !base_path.ends_with('/') => {
      rest.strip_prefix('/').unwrap_or(rest)
    }
    Some(rest) => rest,
    None => path,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::model::ManifestEntry;
  use crate::models::EmittedAsset;

  fn manifest_with(name: &str, paths: &[&str]) -> Manifest {
    let mut entry = ManifestEntry::default();
    for path in paths {
      entry.record("js", path.to_string());
    }
    let mut manifest = Manifest::default();
    manifest.insert(name, entry);
    manifest
  }

  fn output_with(name: &str, source: &str) -> BuildOutput {
    BuildOutput::default().with_asset(name, EmittedAsset {
      integrity: None,
      source: Some(source.to_string()),
    })
  }

  #[test]
  fn strips_base_and_host_prefixes() {
    let hosts = vec!["cdn1.example.com".to_string()];
    assert_eq!(
      emitted_asset_name("//cdn1.example.com/static/runtime.js", "/static/", &hosts),
      "runtime.js"
    );
    assert_eq!(emitted_asset_name("/static/runtime.js", "/static", &[]), "runtime.js");
    assert_eq!(emitted_asset_name("runtime.js", "", &[]), "runtime.js");
  }

  #[test]
  fn overlapping_hosts_resolve_to_the_assigned_one() {
    let hosts = vec!["cdn.example.com".to_string(), "cdn.example.com.au".to_string()];
    let name = "manifest-10.js";
    let path = format!("{}/static/{name}", host_prefix(name, &hosts));
    assert!(path.starts_with("//cdn.example.com.au/"));
    assert_eq!(emitted_asset_name(&path, "/static/", &hosts), name);
  }

  #[test]
  fn inlines_last_script_of_the_entry() {
    let mut manifest = manifest_with("manifest", &["/static/a.js", "/static/b.js"]);
    let output = output_with("b.js", "(function(){})()");

    inline_manifest_source(&mut manifest, &output, "manifest", "/static/", &[]).unwrap();
    assert_eq!(manifest.get("manifest").unwrap().text(), Some("(function(){})()"));
  }

  #[test]
  fn absent_entry_is_not_an_error() {
    let mut manifest = manifest_with("main", &["main.js"]);
    inline_manifest_source(&mut manifest, &BuildOutput::default(), "manifest", "", &[]).unwrap();
    assert_eq!(manifest.get("main").unwrap().text(), None);
  }

  #[test]
  fn empty_source_is_fatal() {
    let mut manifest = manifest_with("manifest", &["manifest.js"]);
    let output = output_with("manifest.js", "");

    let err = inline_manifest_source(&mut manifest, &output, "manifest", "", &[]).unwrap_err();
    assert!(matches!(err, BuildError::ManifestInlineMissing { .. }));
  }

  #[test]
  fn entry_without_script_is_fatal() {
    let mut entry = ManifestEntry::default();
    entry.record("css", "manifest.css".into());
    let mut manifest = Manifest::default();
    manifest.insert("manifest", entry);

    let err =
      inline_manifest_source(&mut manifest, &BuildOutput::default(), "manifest", "", &[]).unwrap_err();
    assert!(matches!(err, BuildError::ManifestScriptMissing { .. }));
  }
}
