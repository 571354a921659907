use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::OverlayConfig;
use crate::overlay::overrides::PhysicalOverrides;
use crate::paths::VirtualPath;
use crate::provider::ResourceProvider;
use crate::tree::{ResourceFile, ResourceFolder};

/// Where an overlay file's contents come from.
#[derive(Debug, Clone)]
pub enum FileSource {
  /// Embedded in a loaded module.
  Embedded(Arc<ResourceFile>),
  /// A file on disk.
  Physical(PathBuf),
}

/// Where an overlay folder comes from.
#[derive(Debug, Clone)]
pub enum FolderSource {
  /// A folder of the embedded tree; a physical directory at the same path may also exist.
  Embedded(Arc<ResourceFolder>),
  /// A directory that only exists on disk.
  Physical(PathBuf),
}

/// A file entry in a merged listing.
#[derive(Debug, Clone)]
pub struct OverlayFile {
  /// Virtual path the file is listed under.
  pub virtual_path: VirtualPath,
  /// Backing storage.
  pub source: FileSource,
}

impl OverlayFile {
  /// Returns `true` when the file is read from disk.
  pub fn is_physical(&self) -> bool {
    matches!(self.source, FileSource::Physical(_))
  }

  /// File contents.
  pub fn read(&self) -> io::Result<Cow<'_, [u8]>> {
    match &self.source {
      FileSource::Physical(path) => fs::read(path).map(Cow::Owned),
      FileSource::Embedded(file) => file.open().ok_or_else(|| {
        io::Error::new(
          io::ErrorKind::NotFound,
          format!("resource {} is no longer available", file.resource_name()),
        )
      }),
    }
  }
}

/// A folder entry in a merged listing.
#[derive(Debug, Clone)]
pub struct OverlayFolder {
  /// Virtual path the folder is listed under.
  pub virtual_path: VirtualPath,
  /// Backing storage.
  pub source: FolderSource,
}

/// Embedded and physical contents of one virtual directory.
#[derive(Debug, Clone)]
pub struct MergedDirectory {
  /// Virtual path of the directory.
  pub virtual_path: VirtualPath,
  /// Embedded folder at this path, if any.
  pub embedded: Option<Arc<ResourceFolder>>,
  /// Physical directory at this path, if any.
  pub physical: Option<PathBuf>,
  /// Files sorted by virtual path.
  pub files: Vec<OverlayFile>,
  /// Subfolders sorted by virtual path.
  pub folders: Vec<OverlayFolder>,
}

/// Combines the embedded tree with a physical directory laid out the same way.
///
/// A physical file shadows the embedded file at the same virtual path, and physical
/// directories contribute entries the embedded tree lacks.
#[derive(Debug)]
pub struct OverlayResolver {
  provider: Arc<ResourceProvider>,
  physical_root: Option<PathBuf>,
  overrides: Option<PhysicalOverrides>,
}

impl OverlayResolver {
  /// Serve only embedded content.
  pub fn new(provider: Arc<ResourceProvider>) -> Self {
    Self {
      provider,
      physical_root: None,
      overrides: None,
    }
  }

  /// Build a resolver from overlay settings.
  ///
  /// Project overrides are located relative to the physical root, or the current
  /// directory when none is configured.
  pub fn from_config(provider: Arc<ResourceProvider>, config: &OverlayConfig) -> Self {
    let mut resolver = Self::new(provider);
    if let Some(root) = &config.physical_root {
      resolver = resolver.with_physical_root(root);
    }
    if config.project_overrides {
      let host_root = config.physical_root.clone();
      resolver = resolver.with_overrides(PhysicalOverrides::new(move || {
        host_root
          .clone()
          .or_else(|| std::env::current_dir().ok())
          .unwrap_or_default()
      }));
    }
    resolver
  }

  /// Shadow embedded content with files under `root`.
  pub fn with_physical_root(mut self, root: impl Into<PathBuf>) -> Self {
    self.physical_root = Some(root.into());
    self
  }

  /// Replace embedded files with newer copies from their project directories.
  pub fn with_overrides(mut self, overrides: PhysicalOverrides) -> Self {
    self.overrides = Some(overrides);
    self
  }

  /// Provider serving the embedded side.
  pub fn provider(&self) -> &Arc<ResourceProvider> {
    &self.provider
  }

  /// Location on disk that mirrors `virtual_path`.
  pub fn physical_path(&self, virtual_path: &VirtualPath) -> Option<PathBuf> {
    let mut path = self.physical_root.clone()?;
    path.extend(virtual_path.segments());
    Some(path)
  }

  /// Returns `true` when the directory exists embedded or on disk.
  pub fn directory_exists(&self, path: &str) -> bool {
    self.directory(path).is_some()
  }

  /// Merged listing of a directory.
  pub fn directory(&self, path: &str) -> Option<MergedDirectory> {
    let virtual_path = VirtualPath::parse(path).ok()?;
    let embedded = self.provider.resolve_folder(&virtual_path);
    let physical = self
      .physical_path(&virtual_path)
      .filter(|path| path.is_dir());

    if embedded.is_none() && physical.is_none() {
      return None;
    }

    let mut files = Vec::new();
    let mut folders = Vec::new();

    if let Some(folder) = &embedded {
      files.extend(folder.files().map(|(name, file)| OverlayFile {
        virtual_path: virtual_path.join(name),
        source: FileSource::Embedded(Arc::clone(file)),
      }));
      folders.extend(folder.folders().map(|child| OverlayFolder {
        virtual_path: virtual_path.join(child.name()),
        source: FolderSource::Embedded(Arc::clone(child)),
      }));
    }

    if let Some(dir) = &physical {
      let (physical_files, physical_folders) = read_physical(dir, &virtual_path);

      let shadowed: HashSet<String> = physical_files
        .iter()
        .map(|file| file.virtual_path.key())
        .collect();
      files.retain(|file| !shadowed.contains(&file.virtual_path.key()));
      files.extend(physical_files);

      let present: HashSet<String> = folders
        .iter()
        .map(|folder| folder.virtual_path.key())
        .collect();
      folders.extend(
        physical_folders
          .into_iter()
          .filter(|folder| !present.contains(&folder.virtual_path.key())),
      );
    }

    files.sort_by(|left, right| compare_paths(&left.virtual_path, &right.virtual_path));
    folders.sort_by(|left, right| compare_paths(&left.virtual_path, &right.virtual_path));

    debug!(
      path = %virtual_path,
      files = files.len(),
      folders = folders.len(),
      "merged directory"
    );

    Some(MergedDirectory {
      virtual_path,
      embedded,
      physical,
      files,
      folders,
    })
  }

  /// Returns `true` when the file exists embedded or on disk.
  pub fn file_exists(&self, path: &str) -> bool {
    self.file(path).is_some()
  }

  /// Resolve a single file: a physical file at the mirrored location wins, then the
  /// embedded file, itself replaced by a project override when overrides are enabled.
  pub fn file(&self, path: &str) -> Option<OverlayFile> {
    let virtual_path = VirtualPath::parse(path).ok()?;

    if let Some(physical) = self.physical_path(&virtual_path).filter(|path| path.is_file()) {
      return Some(OverlayFile {
        virtual_path,
        source: FileSource::Physical(physical),
      });
    }

    let file = self.provider.resolve_file(&virtual_path)?;
    let source = match self
      .overrides
      .as_ref()
      .and_then(|overrides| overrides.resolve(&virtual_path, &file))
    {
      Some(path) => FileSource::Physical(path),
      None => FileSource::Embedded(file),
    };

    Some(OverlayFile {
      virtual_path,
      source,
    })
  }
}

fn read_physical(dir: &Path, virtual_path: &VirtualPath) -> (Vec<OverlayFile>, Vec<OverlayFolder>) {
  let mut files = Vec::new();
  let mut folders = Vec::new();

  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(err) => {
      debug!(dir = %dir.display(), error = %err, "unreadable physical directory");
      return (files, folders);
    }
  };

  for entry in entries.flatten() {
    let path = entry.path();
    let name = entry.file_name().to_string_lossy().into_owned();
    let child = virtual_path.join(&name);
    if path.is_dir() {
      folders.push(OverlayFolder {
        virtual_path: child,
        source: FolderSource::Physical(path),
      });
    } else if path.is_file() {
      files.push(OverlayFile {
        virtual_path: child,
        source: FileSource::Physical(path),
      });
    }
  }

  (files, folders)
}

fn compare_paths(left: &VirtualPath, right: &VirtualPath) -> Ordering {
  left
    .key()
    .cmp(&right.key())
    .then_with(|| left.display().cmp(&right.display()))
}
