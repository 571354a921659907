//! Compiled modules that expose embedded resources through a flat manifest.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::paths::is_metadata_resource;

/// A loaded unit of compiled code carrying embedded resources.
///
/// Resources are addressed by their manifest name, a dot-delimited identifier such as
/// `Vendor.Product.folder.File1.txt`.
pub trait ResourceModule: Send + Sync + fmt::Debug {
  /// Stable module name.
  ///
  /// Serves as the root namespace when none is declared and no build metadata ships.
  fn name(&self) -> &str;

  /// Every manifest resource name the module exposes.
  fn resource_names(&self) -> Vec<String>;

  /// Contents of a resource, or `None` when the module has no such resource.
  fn open(&self, resource_name: &str) -> Option<Cow<'_, [u8]>>;

  /// Root namespaces the resources were embedded under.
  ///
  /// Empty when the module does not declare any; the indexer then infers them from the
  /// manifest names, the build metadata and the module name.
  fn root_namespaces(&self) -> Vec<String> {
    Vec::new()
  }

  /// Serialized build metadata shipped with the module, if any.
  fn build_metadata(&self) -> Option<String> {
    let name = self
      .resource_names()
      .into_iter()
      .find(|name| is_metadata_resource(name))?;
    let bytes = self.open(&name)?;
    String::from_utf8(bytes.into_owned()).ok()
  }
}

/// In-memory module, typically populated from `include_bytes!` tables.
#[derive(Clone, Default)]
pub struct EmbeddedModule {
  name: String,
  namespace: Option<String>,
  resources: BTreeMap<String, Cow<'static, [u8]>>,
}

impl EmbeddedModule {
  /// Create an empty module.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      namespace: None,
      resources: BTreeMap::new(),
    }
  }

  /// Declare the root namespace instead of deriving it from resource names.
  pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
    self.namespace = Some(namespace.into());
    self
  }

  /// Add a resource borrowed from static data.
  pub fn with_static_resource(mut self, name: impl Into<String>, bytes: &'static [u8]) -> Self {
    self.resources.insert(name.into(), Cow::Borrowed(bytes));
    self
  }

  /// Add an owned resource.
  pub fn with_resource(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
    self.resources.insert(name.into(), Cow::Owned(bytes.into()));
    self
  }

  /// Number of resources, including any metadata resource.
  pub fn len(&self) -> usize {
    self.resources.len()
  }

  /// Returns `true` when the module carries no resources.
  pub fn is_empty(&self) -> bool {
    self.resources.is_empty()
  }
}

impl fmt::Debug for EmbeddedModule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EmbeddedModule")
      .field("name", &self.name)
      .field("namespace", &self.namespace)
      .field("resources", &self.resources.keys().collect::<Vec<_>>())
      .finish()
  }
}

impl ResourceModule for EmbeddedModule {
  fn name(&self) -> &str {
    &self.name
  }

  fn resource_names(&self) -> Vec<String> {
    self.resources.keys().cloned().collect()
  }

  fn open(&self, resource_name: &str) -> Option<Cow<'_, [u8]>> {
    self
      .resources
      .get(resource_name)
      .map(|bytes| Cow::Borrowed(bytes.as_ref()))
  }

  fn root_namespaces(&self) -> Vec<String> {
    self.namespace.iter().cloned().collect()
  }
}
