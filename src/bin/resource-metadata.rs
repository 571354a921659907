//! Generate the resource metadata file embedded alongside a project's resources.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use resource_overlay::builder::{MetadataBuilder, collect_embeddable_files, write_metadata};
use resource_overlay::config::ProjectConfig;
use resource_overlay::logging::{LogFormat, init_logging};
use resource_overlay::paths::RemapTable;

/// Map every file of a project onto the paths it can be requested by at runtime.
#[derive(Debug, Parser)]
#[command(name = "resource-metadata", version)]
struct Cli {
  /// Project directory; file paths are recorded relative to it.
  project_dir: PathBuf,

  /// Directory the runtime host serves from; recorded as the project path.
  #[arg(long)]
  host_dir: Option<PathBuf>,

  /// Semicolon-delimited folder prefixes to remap.
  #[arg(long)]
  from: Option<String>,

  /// Semicolon-delimited replacement prefixes, paired with `--from`.
  #[arg(long)]
  to: Option<String>,

  /// Output file (default: `ResourceMetadata.json` in the project directory).
  #[arg(long)]
  output: Option<PathBuf>,

  /// Configuration file (default: `resource-metadata.config.json` in the project directory).
  #[arg(long)]
  config: Option<PathBuf>,

  /// Indent the generated JSON.
  #[arg(long)]
  pretty: bool,

  /// Log output format.
  #[arg(long, value_enum, default_value_t = LogFormat::Text)]
  log_format: LogFormat,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.log_format)?;

  let project_dir = cli
    .project_dir
    .canonicalize()
    .with_context(|| format!("project directory {} not found", cli.project_dir.display()))?;

  let config_path = cli
    .config
    .clone()
    .unwrap_or_else(|| ProjectConfig::default_path(&project_dir));
  let config = match &cli.config {
    Some(path) => ProjectConfig::from_path(path)
      .with_context(|| format!("failed to load configuration from {}", path.display()))?,
    None => ProjectConfig::discover(&project_dir),
  };

  let remaps = match (&cli.from, &cli.to) {
    (None, None) => config.remap_table(),
    (from, to) => RemapTable::parse(
      from.as_deref().unwrap_or(&config.remap_from),
      to.as_deref().unwrap_or(&config.remap_to),
    ),
  };
  let host_dir = match &cli.host_dir {
    Some(dir) => Some(
      std::path::absolute(dir)
        .with_context(|| format!("invalid host directory {}", dir.display()))?,
    ),
    None => config.host_dir_path(&project_dir),
  };
  let output = cli.output.clone().unwrap_or_else(|| config.output_path(&project_dir));

  let files = collect_embeddable_files(
    &project_dir,
    &config.excluded_dirs,
    &[output.as_path(), config_path.as_path()],
  )?;

  let mut builder = MetadataBuilder::new(&project_dir).with_remaps(remaps);
  if let Some(host_dir) = &host_dir {
    builder = builder.with_host_dir(host_dir);
  }
  let metadata = builder.build(&files);

  write_metadata(&output, &metadata, cli.pretty)?;
  info!(output = %output.display(), files = metadata.files.len(), "wrote resource metadata");
  Ok(())
}
