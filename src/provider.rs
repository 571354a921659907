//! Runtime facade answering virtual path queries against the embedded resource tree.

use std::sync::Arc;

use tracing::debug;

use crate::manifest::{ManifestIndex, index_modules};
use crate::models::TranspositionTable;
use crate::module::ResourceModule;
use crate::paths::VirtualPath;
use crate::tree::{ResourceEntry, ResourceFile, ResourceFolder};

/// Resolves virtual paths to embedded files and folders.
///
/// The tree and transposition table are built once in [`ResourceProvider::new`] and never
/// change afterwards, so a provider can be shared freely between threads. Every query
/// accepts either slash direction, an optional leading `~` or `/`, and any casing.
/// Invalid or unknown paths answer `None`/`false`.
#[derive(Debug)]
pub struct ResourceProvider {
  index: ManifestIndex,
}

impl ResourceProvider {
  /// Index every module.
  pub fn new(modules: Vec<Arc<dyn ResourceModule>>) -> Self {
    Self {
      index: index_modules(&modules),
    }
  }

  /// Root of the virtual tree.
  pub fn root(&self) -> &Arc<ResourceFolder> {
    &self.index.root
  }

  /// Indexed modules.
  pub fn modules(&self) -> &[Arc<dyn ResourceModule>] {
    &self.index.modules
  }

  /// Transpositions read from the modules' build metadata.
  pub fn transpositions(&self) -> &TranspositionTable {
    &self.index.transpositions
  }

  /// Manifest names that were skipped while indexing.
  pub fn skipped(&self) -> &[String] {
    &self.index.skipped
  }

  /// Returns `true` when `path` names an embedded folder.
  pub fn folder_exists(&self, path: &str) -> bool {
    self.get_resource_folder(path).is_some()
  }

  /// Returns `true` when `path` names an embedded file.
  pub fn file_exists(&self, path: &str) -> bool {
    self.get_resource_file(path).is_some()
  }

  /// Embedded folder at `path`; `"/"` and `"~/"` address the root.
  pub fn get_resource_folder(&self, path: &str) -> Option<Arc<ResourceFolder>> {
    self.resolve_folder(&parse(path)?)
  }

  /// Embedded file at `path`, honouring build-time transpositions.
  pub fn get_resource_file(&self, path: &str) -> Option<Arc<ResourceFile>> {
    self.resolve_file(&parse(path)?)
  }

  /// Manifest resource name of the file at `path`.
  pub fn get_manifest_resource_name(&self, path: &str) -> Option<String> {
    self
      .get_resource_file(path)
      .map(|file| file.resource_name().to_string())
  }

  /// File or folder at `path`. Paths with an extension are tried as files first.
  pub fn get_entry(&self, path: &str) -> Option<ResourceEntry> {
    let path = parse(path)?;
    if let Some(file) = self.resolve_file(&path) {
      return Some(ResourceEntry::File(file));
    }
    self.resolve_folder(&path).map(ResourceEntry::Folder)
  }

  pub(crate) fn resolve_folder(&self, path: &VirtualPath) -> Option<Arc<ResourceFolder>> {
    if path.is_root() {
      return Some(Arc::clone(&self.index.root));
    }
    self.index.root.find_folder_segments(path.segments())
  }

  pub(crate) fn resolve_file(&self, path: &VirtualPath) -> Option<Arc<ResourceFile>> {
    if !path.has_extension() {
      return None;
    }

    if let Some((module, entry)) = self.index.transpositions.lookup(&path.key()) {
      let found = entry
        .candidates
        .iter()
        .find_map(|candidate| self.index.root.find_file_segments(candidate.segments()));
      if found.is_some() {
        debug!(path = %path, module, "resolved through transposition");
        return found;
      }
    }

    self.index.root.find_file_segments(path.segments())
  }
}

fn parse(path: &str) -> Option<VirtualPath> {
  match VirtualPath::parse(path) {
    Ok(path) => Some(path),
    Err(err) => {
      debug!(path, error = %err, "rejected virtual path");
      None
    }
  }
}
