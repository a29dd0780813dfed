use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use assets_manifest::{
  BuildOutput, BuildStats, DiskFileSystem, ManifestOptions, ManifestPlugin, WriteOutcome,
};

/// Write an asset manifest from a bundler stats file.
#[derive(Parser)]
#[command(name = "assets-manifest")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Bundler stats JSON (hash, publicPath, assetsByChunkName, assets, entrypoints)
  #[arg(long)]
  stats: PathBuf,

  /// Options file (default: assets-manifest.config.{json,yaml,yml} in the working directory)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Bundler output directory, used by `useCompilerPath` and as the default assets directory
  #[arg(long)]
  output_path: Option<PathBuf>,

  /// Directory holding emitted files, read for inlined sources
  #[arg(long)]
  assets_dir: Option<PathBuf>,

  /// Force pretty-printed output
  #[arg(long)]
  pretty: bool,

  /// Print the manifest instead of writing it
  #[arg(long)]
  dry_run: bool,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    )
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let mut options = match &cli.config {
    Some(path) => ManifestOptions::from_path(path)?,
    None => ManifestOptions::discover(&std::env::current_dir()?)?,
  };
  if cli.pretty {
    options.pretty_print = true;
  }

  let stats = load_stats(&cli.stats)?;
  let compiler_output = cli
    .output_path
    .clone()
    .or_else(|| stats.output_path.as_ref().map(PathBuf::from));
  let assets_dir = cli.assets_dir.clone().or_else(|| compiler_output.clone());

  let output = load_build_output(stats, assets_dir.as_deref());
  let plugin = ManifestPlugin::new(options, compiler_output.as_deref())?;

  if cli.dry_run {
    let manifest = plugin.build(&output)?;
    let text = if plugin.options().pretty_print {
      serde_json::to_string_pretty(&manifest)?
    } else {
      serde_json::to_string(&manifest)?
    };
    println!("{text}");
    return Ok(());
  }

  match plugin.emit(&output, Arc::new(DiskFileSystem))?.wait()? {
    WriteOutcome::Written(path) => info!("wrote {}", path.display()),
    WriteOutcome::Unchanged(path) => info!("{} is up to date", path.display()),
    WriteOutcome::InMemory => info!("manifest kept in memory"),
  }
  Ok(())
}

fn load_stats(path: &Path) -> Result<BuildStats> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("stats not found at {}", path.display()))?;
  let stats: BuildStats = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse stats JSON at {}", path.display()))?;
  if stats.assets_by_chunk_name.is_empty() && stats.entrypoints.is_empty() && stats.assets.is_empty() {
    bail!("{} lists no assets", path.display());
  }
  Ok(stats)
}

/// Pair the stats with sources of emitted files found under `assets_dir`.
///
/// Files that cannot be read as UTF-8 simply have no source.
fn load_build_output(stats: BuildStats, assets_dir: Option<&Path>) -> BuildOutput {
  let mut output = BuildOutput::new(stats);
  let Some(dir) = assets_dir else {
    return output;
  };

  for name in output.referenced_asset_names() {
    let clean = name.split('?').next().unwrap_or(&name);
    let path = dir.join(clean);
    match fs::read_to_string(&path) {
      Ok(source) => {
        output.assets.entry(name).or_default().source = Some(source);
      }
      Err(err) => debug!(path = %path.display(), error = %err, "no source for asset"),
    }
  }
  output
}
