//! Immutable folder/file tree reconstructed from embedded resource manifests.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::module::ResourceModule;
use crate::paths::VirtualPath;

/// An embedded file, identified by its manifest resource name.
pub struct ResourceFile {
  module: Arc<dyn ResourceModule>,
  resource_name: String,
  virtual_path: VirtualPath,
  known_as: Vec<VirtualPath>,
  project_path: Option<String>,
}

impl ResourceFile {
  /// Describe a resource of `module` placed at `virtual_path`.
  pub fn new(
    module: Arc<dyn ResourceModule>,
    resource_name: impl Into<String>,
    virtual_path: VirtualPath,
  ) -> Self {
    Self {
      module,
      resource_name: resource_name.into(),
      virtual_path,
      known_as: Vec::new(),
      project_path: None,
    }
  }

  /// Attach the project paths this file is also known by and the project root it came from.
  pub fn with_project_paths(
    mut self,
    known_as: Vec<VirtualPath>,
    project_path: Option<String>,
  ) -> Self {
    self.known_as = known_as;
    self.project_path = project_path;
    self
  }

  /// Fully-qualified manifest resource name.
  pub fn resource_name(&self) -> &str {
    &self.resource_name
  }

  /// Module that embeds the resource.
  pub fn module(&self) -> &Arc<dyn ResourceModule> {
    &self.module
  }

  /// Virtual path derived from the manifest name.
  pub fn virtual_path(&self) -> &VirtualPath {
    &self.virtual_path
  }

  /// File name including its extension.
  pub fn name(&self) -> &str {
    self.virtual_path.file_name().unwrap_or_default()
  }

  /// Ordered project-relative paths the file may also be known by.
  ///
  /// Empty when the module shipped no build metadata for this file.
  pub fn known_as(&self) -> &[VirtualPath] {
    &self.known_as
  }

  /// Project-relative path the file was embedded from.
  pub fn relative_path(&self) -> &VirtualPath {
    self.known_as.last().unwrap_or(&self.virtual_path)
  }

  /// Project root relative to the host directory, as recorded in the build metadata.
  pub fn project_path(&self) -> Option<&str> {
    self.project_path.as_deref()
  }

  /// Resource contents.
  pub fn open(&self) -> Option<Cow<'_, [u8]>> {
    self.module.open(&self.resource_name)
  }

  /// Resource contents decoded as UTF-8.
  pub fn read_to_string(&self) -> Option<String> {
    let bytes = self.open()?;
    String::from_utf8(bytes.into_owned()).ok()
  }

  /// Returns `true` when both handles refer to the same underlying file.
  pub fn same_file(left: &Arc<Self>, right: &Arc<Self>) -> bool {
    Arc::ptr_eq(left, right)
  }
}

impl PartialEq for ResourceFile {
  fn eq(&self, other: &Self) -> bool {
    self.resource_name == other.resource_name && self.module.name() == other.module.name()
  }
}

impl Eq for ResourceFile {}

impl fmt::Debug for ResourceFile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResourceFile")
      .field("module", &self.module.name())
      .field("resource_name", &self.resource_name)
      .field("virtual_path", &self.virtual_path.rooted())
      .finish()
  }
}

/// A folder in the reconstructed tree.
///
/// Children are unique by case-insensitive name and ordered by that name.
pub struct ResourceFolder {
  name: String,
  virtual_path: VirtualPath,
  parent: Weak<ResourceFolder>,
  files: BTreeMap<String, (String, Arc<ResourceFile>)>,
  folders: BTreeMap<String, Arc<ResourceFolder>>,
}

impl ResourceFolder {
  /// Folder name; empty for the root.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Virtual path of the folder.
  pub fn virtual_path(&self) -> &VirtualPath {
    &self.virtual_path
  }

  /// Containing folder, `None` for the root.
  pub fn parent(&self) -> Option<Arc<ResourceFolder>> {
    self.parent.upgrade()
  }

  /// Returns `true` for the tree root.
  pub fn is_root(&self) -> bool {
    self.virtual_path.is_root()
  }

  /// Files directly inside this folder with the name they are listed under.
  pub fn files(&self) -> impl Iterator<Item = (&str, &Arc<ResourceFile>)> {
    self
      .files
      .values()
      .map(|(name, file)| (name.as_str(), file))
  }

  /// Direct subfolders.
  pub fn folders(&self) -> impl Iterator<Item = &Arc<ResourceFolder>> {
    self.folders.values()
  }

  /// Direct child file by case-insensitive name.
  pub fn file(&self, name: &str) -> Option<&Arc<ResourceFile>> {
    self.files.get(&name.to_lowercase()).map(|(_, file)| file)
  }

  /// Direct subfolder by case-insensitive name.
  pub fn folder(&self, name: &str) -> Option<&Arc<ResourceFolder>> {
    self.folders.get(&name.to_lowercase())
  }

  /// Find a descendant folder from a relative path using either separator.
  pub fn find_folder(&self, path: &str) -> Option<Arc<ResourceFolder>> {
    let path = VirtualPath::parse(path).ok()?;
    self.find_folder_segments(path.segments())
  }

  /// Find a descendant folder from path segments; an empty slice yields `None`.
  pub fn find_folder_segments(&self, segments: &[String]) -> Option<Arc<ResourceFolder>> {
    let (first, rest) = segments.split_first()?;
    let mut current = self.folder(first)?;
    for segment in rest {
      current = current.folder(segment)?;
    }
    Some(Arc::clone(current))
  }

  /// Find a descendant file from path segments.
  pub fn find_file_segments(&self, segments: &[String]) -> Option<Arc<ResourceFile>> {
    let (name, folders) = segments.split_last()?;
    if folders.is_empty() {
      return self.file(name).cloned();
    }
    self.find_folder_segments(folders)?.file(name).cloned()
  }

  /// Find a descendant file or folder. Paths with an extension are tried as files first.
  pub fn find_entry(&self, path: &VirtualPath) -> Option<ResourceEntry> {
    if path.has_extension() {
      if let Some(file) = self.find_file_segments(path.segments()) {
        return Some(ResourceEntry::File(file));
      }
    }
    self
      .find_folder_segments(path.segments())
      .map(ResourceEntry::Folder)
  }

  /// Number of files in this folder and every descendant, counting alias links.
  pub fn file_count(&self) -> usize {
    self.files.len() + self.folders.values().map(|folder| folder.file_count()).sum::<usize>()
  }
}

impl fmt::Debug for ResourceFolder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResourceFolder")
      .field("virtual_path", &self.virtual_path.rooted())
      .field("files", &self.files.values().map(|(name, _)| name).collect::<Vec<_>>())
      .field("folders", &self.folders.values().collect::<Vec<_>>())
      .finish()
  }
}

/// Either kind of tree node.
#[derive(Debug, Clone)]
pub enum ResourceEntry {
  /// An embedded file.
  File(Arc<ResourceFile>),
  /// A folder.
  Folder(Arc<ResourceFolder>),
}

impl ResourceEntry {
  /// Virtual path of the node.
  pub fn virtual_path(&self) -> &VirtualPath {
    match self {
      Self::File(file) => file.virtual_path(),
      Self::Folder(folder) => folder.virtual_path(),
    }
  }

  /// Returns `true` for files.
  pub fn is_file(&self) -> bool {
    matches!(self, Self::File(_))
  }
}

/// Mutable staging area used while indexing, frozen into a [`ResourceFolder`] tree.
#[derive(Debug, Default)]
pub(crate) struct FolderBuilder {
  name: String,
  files: BTreeMap<String, (String, Arc<ResourceFile>)>,
  folders: BTreeMap<String, FolderBuilder>,
}

impl FolderBuilder {
  /// Walk to a descendant, creating folders on demand. The first spelling seen wins.
  pub(crate) fn folder_mut(&mut self, segments: &[String]) -> &mut FolderBuilder {
    let mut current = self;
    for segment in segments {
      current = current
        .folders
        .entry(segment.to_lowercase())
        .or_insert_with(|| FolderBuilder {
          name: segment.clone(),
          ..FolderBuilder::default()
        });
    }
    current
  }

  /// Place a file; returns the file already occupying the slot when there is one.
  pub(crate) fn insert_file(
    &mut self,
    folders: &[String],
    name: &str,
    file: Arc<ResourceFile>,
  ) -> Result<(), Arc<ResourceFile>> {
    let folder = self.folder_mut(folders);
    let key = name.to_lowercase();
    if let Some((_, existing)) = folder.files.get(&key) {
      return Err(Arc::clone(existing));
    }
    folder.files.insert(key, (name.to_string(), file));
    Ok(())
  }

  /// Look up a staged file.
  pub(crate) fn file(&self, segments: &[String]) -> Option<&Arc<ResourceFile>> {
    let (name, folders) = segments.split_last()?;
    let mut current = self;
    for segment in folders {
      current = current.folders.get(&segment.to_lowercase())?;
    }
    current.files.get(&name.to_lowercase()).map(|(_, file)| file)
  }

  /// Freeze the staged tree into its immutable form.
  pub(crate) fn freeze(self) -> Arc<ResourceFolder> {
    self.freeze_at(VirtualPath::root(), Weak::new())
  }

  fn freeze_at(
    self,
    virtual_path: VirtualPath,
    parent: Weak<ResourceFolder>,
  ) -> Arc<ResourceFolder> {
    let FolderBuilder {
      name,
      files,
      folders,
    } = self;

    Arc::new_cyclic(|me| {
      let folders = folders
        .into_iter()
        .map(|(key, child)| {
          let child_path = virtual_path.join(&child.name);
          (key, child.freeze_at(child_path, me.clone()))
        })
        .collect();

      ResourceFolder {
        name,
        virtual_path,
        parent,
        files,
        folders,
      }
    })
  }
}
