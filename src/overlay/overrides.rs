use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use dashmap::DashMap;
use tracing::debug;

use crate::paths::{VirtualPath, split_segments};
use crate::tree::ResourceFile;

type HostLocator = Box<dyn Fn() -> PathBuf + Send + Sync>;

/// Finds newer copies of embedded files in the project directories they were built from.
///
/// The host root is located once, on first use. Each virtual path is looked up on disk at
/// most once; the outcome, including "no override", is remembered for the life of the value.
pub struct PhysicalOverrides {
  host_root: OnceLock<PathBuf>,
  locate_host: HostLocator,
  cache: DashMap<String, Option<PathBuf>>,
}

impl PhysicalOverrides {
  /// Locate the host root lazily with `locate_host`.
  pub fn new(locate_host: impl Fn() -> PathBuf + Send + Sync + 'static) -> Self {
    Self {
      host_root: OnceLock::new(),
      locate_host: Box::new(locate_host),
      cache: DashMap::new(),
    }
  }

  /// Use a known host root.
  pub fn with_host_root(root: impl Into<PathBuf>) -> Self {
    Self {
      host_root: OnceLock::from(root.into()),
      locate_host: Box::new(PathBuf::new),
      cache: DashMap::new(),
    }
  }

  /// Directory the project paths recorded in build metadata are relative to.
  pub fn host_root(&self) -> &Path {
    self.host_root.get_or_init(|| {
      let root = (self.locate_host)();
      debug!(root = %root.display(), "located host root");
      root
    })
  }

  /// Physical file overriding `file` when requested as `virtual_path`.
  pub fn resolve(&self, virtual_path: &VirtualPath, file: &ResourceFile) -> Option<PathBuf> {
    let key = virtual_path.key();
    if let Some(cached) = self.cache.get(&key) {
      return cached.value().clone();
    }

    let resolved = self.search(file);
    debug!(path = %virtual_path, found = resolved.is_some(), "cached physical override");
    self.cache.entry(key).or_insert(resolved).value().clone()
  }

  /// Number of virtual paths searched so far.
  pub fn cached(&self) -> usize {
    self.cache.len()
  }

  /// Try the recorded project path, then each of its ancestors, down to the host root.
  fn search(&self, file: &ResourceFile) -> Option<PathBuf> {
    let project_path = split_segments(file.project_path()?);
    let relative = file.relative_path().segments();

    (0..=project_path.len()).rev().find_map(|keep| {
      let mut candidate = self.host_root().to_path_buf();
      candidate.extend(&project_path[..keep]);
      candidate.extend(relative);
      candidate.is_file().then_some(candidate)
    })
  }
}

impl fmt::Debug for PhysicalOverrides {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PhysicalOverrides")
      .field("host_root", &self.host_root.get())
      .field("cached", &self.cache.len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use tempfile::tempdir;

  use crate::module::{EmbeddedModule, ResourceModule};

  fn embedded_file(project_path: &str) -> ResourceFile {
    let module: Arc<dyn ResourceModule> = Arc::new(
      EmbeddedModule::new("Site").with_static_resource("Site.folder.Class1.txt", b"embedded"),
    );
    let path = VirtualPath::parse("folder/Class1.txt").unwrap();
    ResourceFile::new(module, "Site.folder.Class1.txt", path.clone())
      .with_project_paths(vec![path], Some(project_path.to_string()))
  }

  #[test]
  fn finds_file_in_project_directory() {
    let temp = tempdir().unwrap();
    let host = temp.path().join("Host");
    fs::create_dir_all(&host).unwrap();
    fs::create_dir_all(temp.path().join("Site/folder")).unwrap();
    fs::write(temp.path().join("Site/folder/Class1.txt"), "edited").unwrap();

    let overrides = PhysicalOverrides::with_host_root(&host);
    let path = VirtualPath::parse("folder/Class1.txt").unwrap();
    let found = overrides.resolve(&path, &embedded_file("..\\Site\\")).unwrap();

    assert_eq!(fs::read_to_string(found).unwrap(), "edited");
  }

  #[test]
  fn walks_up_the_project_path() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("folder")).unwrap();
    fs::write(temp.path().join("folder/Class1.txt"), "host copy").unwrap();

    let overrides = PhysicalOverrides::with_host_root(temp.path());
    let path = VirtualPath::parse("folder/Class1.txt").unwrap();
    let found = overrides.resolve(&path, &embedded_file("Missing/Deeper/"));
    assert_eq!(found, Some(temp.path().join("folder").join("Class1.txt")));
  }

  #[test]
  fn remembers_outcomes_permanently() {
    let temp = tempdir().unwrap();
    let overrides = PhysicalOverrides::with_host_root(temp.path());
    let path = VirtualPath::parse("folder/Class1.txt").unwrap();
    let file = embedded_file("");

    assert!(overrides.resolve(&path, &file).is_none());
    fs::create_dir_all(temp.path().join("folder")).unwrap();
    fs::write(temp.path().join("folder/Class1.txt"), "late").unwrap();
    assert!(overrides.resolve(&path, &file).is_none());
    assert_eq!(overrides.cached(), 1);
  }

  #[test]
  fn files_without_metadata_are_never_overridden() {
    let temp = tempdir().unwrap();
    let module: Arc<dyn ResourceModule> = Arc::new(EmbeddedModule::new("Bare"));
    let path = VirtualPath::parse("a.txt").unwrap();
    let file = ResourceFile::new(module, "Bare.a.txt", path.clone());
    fs::write(temp.path().join("a.txt"), "disk").unwrap();

    let overrides = PhysicalOverrides::with_host_root(temp.path());
    assert!(overrides.resolve(&path, &file).is_none());
  }

  #[test]
  fn locates_host_root_once() {
    let temp = tempdir().unwrap();
    let root = temp.path().to_path_buf();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let overrides = Arc::new(PhysicalOverrides::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      root.clone()
    }));

    let handles: Vec<_> = (0..4)
      .map(|index| {
        let overrides = Arc::clone(&overrides);
        std::thread::spawn(move || {
          let path = VirtualPath::parse(&format!("file{index}.txt")).unwrap();
          overrides.resolve(&path, &embedded_file(""));
        })
      })
      .collect();
    for handle in handles {
      handle.join().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(overrides.host_root(), temp.path());
    assert_eq!(overrides.cached(), 4);
  }
}
