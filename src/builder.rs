//! Build-time metadata generator mapping project files onto their embedded lookup keys.

use std::collections::BTreeMap;
use std::fs;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::models::BuildMetadata;
use crate::paths::{RemapTable, generate_candidates, join_platform};

/// Generic build result type used by the file-writing helpers.
pub type BuildResult<T> = Result<T>;

/// Produces [`BuildMetadata`] for the files embedded from one project.
#[derive(Debug, Clone)]
pub struct MetadataBuilder<'a> {
  project_dir: &'a Path,
  host_dir: Option<&'a Path>,
  remaps: RemapTable,
}

impl<'a> MetadataBuilder<'a> {
  /// Create a builder whose relative paths are computed against `project_dir`.
  pub fn new(project_dir: &'a Path) -> Self {
    Self {
      project_dir,
      host_dir: None,
      remaps: RemapTable::default(),
    }
  }

  /// Record the project root relative to the directory the runtime host serves from.
  pub fn with_host_dir(mut self, host_dir: &'a Path) -> Self {
    self.host_dir = Some(host_dir);
    self
  }

  /// Apply folder remappings to every file.
  pub fn with_remaps(mut self, remaps: RemapTable) -> Self {
    self.remaps = remaps;
    self
  }

  /// Map every file to its ordered lookup candidates.
  ///
  /// Files outside the project directory are skipped with a diagnostic; the build itself
  /// never fails.
  pub fn build<P: AsRef<Path>>(&self, files: &[P]) -> BuildMetadata {
    let anchor = lexical_segments(self.project_dir);
    let mut entries = BTreeMap::new();

    for file in files {
      let file = file.as_ref();
      let Some(relative) = relative_segments(&anchor, file) else {
        warn!(
          file = %file.display(),
          project = %self.project_dir.display(),
          "file is outside the project directory"
        );
        continue;
      };

      let relative_path = join_platform(&relative);
      let candidates = generate_candidates(&self.remaps, &relative_path);
      debug!(file = %relative_path, candidates = candidates.len(), "mapped project file");
      entries.insert(relative_path, candidates);
    }

    info!(
      files = entries.len(),
      remaps = self.remaps.len(),
      "generated resource metadata"
    );

    BuildMetadata {
      files: entries,
      project_path: self.project_path(),
    }
  }

  /// Project directory relative to the host directory, with a trailing separator.
  ///
  /// Empty when no host directory is configured or both directories coincide.
  pub fn project_path(&self) -> String {
    let Some(host_dir) = self.host_dir else {
      return String::new();
    };

    let host = lexical_segments(host_dir);
    let project = lexical_segments(self.project_dir);
    let shared = host
      .iter()
      .zip(project.iter())
      .take_while(|(left, right)| left == right)
      .count();

    let mut segments: Vec<String> =
      std::iter::repeat_n("..".to_string(), host.len() - shared).collect();
    segments.extend_from_slice(&project[shared..]);

    if segments.is_empty() {
      String::new()
    } else {
      format!("{}{}", join_platform(&segments), MAIN_SEPARATOR_STR)
    }
  }
}

/// Split a path on either separator, resolving `.` and `..` lexically.
fn lexical_segments(path: &Path) -> Vec<String> {
  let text = path.to_string_lossy();
  let mut segments: Vec<String> = Vec::new();
  for segment in text.split(['/', '\\']) {
    match segment {
      "" | "." => {}
      ".." => {
        segments.pop();
      }
      value => segments.push(value.to_string()),
    }
  }
  segments
}

fn relative_segments(anchor: &[String], file: &Path) -> Option<Vec<String>> {
  let segments = lexical_segments(file);
  if segments.len() <= anchor.len() || segments[..anchor.len()] != anchor[..] {
    return None;
  }
  Some(segments[anchor.len()..].to_vec())
}

/// Walk the project directory collecting every file that may be embedded.
///
/// Hidden entries and directories named in `excluded_dirs` are skipped. The result is
/// sorted so that generated metadata is stable between runs.
pub fn collect_project_files(
  project_dir: &Path,
  excluded_dirs: &[String],
) -> BuildResult<Vec<PathBuf>> {
  let mut files = Vec::new();
  collect_files_recursively(project_dir, excluded_dirs, &mut files)?;
  files.sort();
  Ok(files)
}

/// Like [`collect_project_files`], leaving out generator inputs and outputs such as the
/// configuration and metadata files. Paths are compared after canonicalization.
pub fn collect_embeddable_files(
  project_dir: &Path,
  excluded_dirs: &[String],
  skip: &[&Path],
) -> BuildResult<Vec<PathBuf>> {
  let skipped: Vec<PathBuf> = skip.iter().map(|path| canonical(path)).collect();
  let files = collect_project_files(project_dir, excluded_dirs)?
    .into_iter()
    .filter(|file| !skipped.contains(&canonical(file)))
    .collect();
  Ok(files)
}

fn canonical(path: &Path) -> PathBuf {
  path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn collect_files_recursively(
  dir: &Path,
  excluded_dirs: &[String],
  files: &mut Vec<PathBuf>,
) -> BuildResult<()> {
  let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

  for entry in entries {
    let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
    let file_name = entry.file_name();
    let name = file_name.to_string_lossy();
    if name.starts_with('.') {
      continue;
    }

    let file_type = entry.file_type()?;
    if file_type.is_dir() {
      if excluded_dirs.iter().any(|excluded| excluded.eq_ignore_ascii_case(&name)) {
        continue;
      }
      collect_files_recursively(&entry.path(), excluded_dirs, files)?;
    } else if file_type.is_file() {
      files.push(entry.path());
    }
  }

  Ok(())
}

/// Serialize metadata to `path`, creating parent directories as needed.
pub fn write_metadata(path: &Path, metadata: &BuildMetadata, pretty: bool) -> BuildResult<()> {
  let json = if pretty {
    metadata.to_json_pretty()
  } else {
    metadata.to_json()
  }
  .context("failed to serialise resource metadata")?;

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
