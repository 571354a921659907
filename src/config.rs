//! Configuration for the metadata generator and the runtime overlay.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::{METADATA_RESOURCE_NAME, RemapTable};

const DEFAULT_CONFIG_FILE: &str = "resource-metadata.config.json";

/// Discoverable project configuration for the build-time metadata generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
  /// Semicolon-delimited relative folder prefixes to remap.
  pub remap_from: String,
  /// Semicolon-delimited target prefixes, paired positionally with `remap_from`.
  pub remap_to: String,
  /// Directory the runtime host treats as its root, relative to the project directory.
  pub host_dir: Option<String>,
  /// File name of the generated metadata, written inside the project directory.
  pub output_file: String,
  /// Directory names skipped while scanning the project for embedded files.
  pub excluded_dirs: Vec<String>,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      remap_from: String::new(),
      remap_to: String::new(),
      host_dir: None,
      output_file: METADATA_RESOURCE_NAME.into(),
      excluded_dirs: vec![
        "bin".into(),
        "obj".into(),
        "target".into(),
        "node_modules".into(),
      ],
    }
  }
}

impl ProjectConfig {
  /// Attempt to load configuration from the provided project directory.
  ///
  /// When the configuration file does not exist or fails to parse we fallback to default
  /// values so the generator can still produce metadata without remapping.
  pub fn discover(project_dir: &Path) -> Self {
    Self::from_path(&Self::default_path(project_dir)).unwrap_or_default()
  }

  /// Configuration file looked up inside `project_dir` when none is given.
  pub fn default_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DEFAULT_CONFIG_FILE)
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Remapping table described by the `remap_from`/`remap_to` lists.
  pub fn remap_table(&self) -> RemapTable {
    RemapTable::parse(&self.remap_from, &self.remap_to)
  }

  /// Absolute host directory, if one is configured.
  pub fn host_dir_path(&self, project_dir: &Path) -> Option<PathBuf> {
    self.host_dir.as_ref().map(|dir| project_dir.join(dir))
  }

  /// Location of the generated metadata file.
  pub fn output_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.output_file)
  }
}

/// Runtime overlay settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
  /// Directory whose files shadow embedded resources at the same virtual path.
  pub physical_root: Option<PathBuf>,
  /// Search the original project directories for newer copies of embedded files.
  ///
  /// Intended for local development, where the project sources sit next to the host.
  pub project_overrides: bool,
}

impl OverlayConfig {
  /// Read overlay settings from a JSON file, falling back to defaults.
  pub fn discover(path: &Path) -> Self {
    fs::read_to_string(path)
      .ok()
      .and_then(|content| serde_json::from_str(&content).ok())
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn falls_back_to_defaults_without_file() {
    let temp = tempdir().unwrap();
    let config = ProjectConfig::discover(temp.path());
    assert_eq!(config, ProjectConfig::default());
    assert!(config.remap_table().is_empty());
    assert_eq!(config.output_path(temp.path()), temp.path().join("ResourceMetadata.json"));
  }

  #[test]
  fn reads_partial_configuration() {
    let temp = tempdir().unwrap();
    fs::write(
      temp.path().join(DEFAULT_CONFIG_FILE),
      r#"{"remapFrom": "A\\B;A\\C", "remapTo": "Scripts\\A\\B;thirdparty\\src",
          "hostDir": "../Web"}"#,
    )
    .unwrap();

    let config = ProjectConfig::discover(temp.path());
    assert_eq!(config.remap_table().len(), 2);
    assert_eq!(config.host_dir_path(temp.path()), Some(temp.path().join("../Web")));
    assert_eq!(config.excluded_dirs, ProjectConfig::default().excluded_dirs);
  }

  #[test]
  fn ignores_malformed_configuration() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "{ broken").unwrap();
    assert_eq!(ProjectConfig::discover(temp.path()), ProjectConfig::default());
  }

  #[test]
  fn reads_overlay_settings() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("overlay.json");
    fs::write(&path, r#"{"physicalRoot": "/srv/site", "projectOverrides": true}"#).unwrap();

    let config = OverlayConfig::discover(&path);
    assert_eq!(config.physical_root, Some(PathBuf::from("/srv/site")));
    assert!(config.project_overrides);
    assert_eq!(
      OverlayConfig::discover(&temp.path().join("missing.json")),
      OverlayConfig::default()
    );
  }
}
