//! Build the resource tree from the manifests of loaded modules.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::manifest::naming::{KnownLayout, resolve_name};
use crate::manifest::prefixes::{derive_namespaces, minimize_prefixes, strip_root_prefix};
use crate::models::{BuildMetadata, ProjectTransposition, TranspositionEntry, TranspositionTable};
use crate::module::ResourceModule;
use crate::paths::{VirtualPath, is_metadata_resource};
use crate::tree::{FolderBuilder, ResourceFile, ResourceFolder};

/// Tree and transposition table produced by [`index_modules`].
#[derive(Debug)]
pub struct ManifestIndex {
  /// Root of the reconstructed folder tree.
  pub root: Arc<ResourceFolder>,
  /// Transpositions read from the modules' build metadata.
  pub transpositions: TranspositionTable,
  /// Modules whose resources were indexed, in load order.
  pub modules: Vec<Arc<dyn ResourceModule>>,
  /// Resources skipped because their names could not be split.
  pub skipped: Vec<String>,
}

/// Index every module into a single folder tree.
///
/// Files are first placed at the path derived from their manifest name. Once every module
/// has been indexed, files described by build metadata are linked again under each of
/// their alias paths, so that a remapped folder such as `Scripts` exists and enumerates.
pub fn index_modules(modules: &[Arc<dyn ResourceModule>]) -> ManifestIndex {
  let mut builder = FolderBuilder::default();
  let mut transpositions = TranspositionTable::default();
  let mut indexed = Vec::new();
  let mut skipped = Vec::new();
  let mut pending_aliases: Vec<(Arc<ResourceFile>, Vec<VirtualPath>)> = Vec::new();
  let mut file_count = 0usize;

  for module in modules {
    let transposition = load_transposition(module.as_ref());
    let known = transposition
      .as_ref()
      .map(|project| KnownLayout::from_paths(project.entries().map(|entry| &entry.relative_path)))
      .unwrap_or_default();
    let mut names = module.resource_names();
    names.sort();

    let prefixes = root_prefixes(module.as_ref(), &names, &known);
    debug!(module = module.name(), ?prefixes, "computed root namespaces");

    for resource_name in names {
      if is_metadata_resource(&resource_name) {
        continue;
      }

      let remainder = strip_root_prefix(&prefixes, &resource_name).unwrap_or(&resource_name);
      let Some(resolved) = resolve_name(remainder, &known) else {
        warn!(
          module = module.name(),
          resource = %resource_name,
          "skipping resource without a recognisable file extension"
        );
        skipped.push(resource_name);
        continue;
      };

      let virtual_path = resolved.virtual_path();
      let entry = transposition
        .as_ref()
        .and_then(|project| project.lookup(&virtual_path.key()).map(|entry| (project, entry)));

      let mut file = ResourceFile::new(Arc::clone(module), resource_name.as_str(), virtual_path);
      if let Some((project, entry)) = entry {
        file = file.with_project_paths(
          entry.candidates.clone(),
          Some(project.project_path().to_string()),
        );
      }
      let file = Arc::new(file);

      match builder.insert_file(&resolved.folders, &resolved.file_name, Arc::clone(&file)) {
        Ok(()) => {
          file_count += 1;
          if let Some((_, entry)) = entry {
            pending_aliases.push((file, aliases_of(entry)));
          }
        }
        Err(existing) => warn!(
          resource = %resource_name,
          existing = existing.resource_name(),
          path = %file.virtual_path(),
          "duplicate virtual path, keeping the first resource"
        ),
      }
    }

    if let Some(project) = transposition {
      transpositions.insert(module.name(), project);
    }
    indexed.push(Arc::clone(module));
  }

  let alias_count = link_aliases(&mut builder, pending_aliases);

  info!(
    modules = indexed.len(),
    files = file_count,
    aliases = alias_count,
    skipped = skipped.len(),
    "indexed embedded resources"
  );

  ManifestIndex {
    root: builder.freeze(),
    transpositions,
    modules: indexed,
    skipped,
  }
}

/// Root namespaces stripped from a module's manifest names.
///
/// Declared namespaces are used as given. Otherwise, with build metadata, each minimized
/// namespace derived from the names is shortened to the prefix under which the most
/// remainders spell recorded files. Without metadata the module name is the root, and
/// derived namespaces only cover names outside it.
fn root_prefixes(
  module: &dyn ResourceModule,
  names: &[String],
  known: &KnownLayout,
) -> Vec<String> {
  let declared = module.root_namespaces();
  if !declared.is_empty() {
    return minimize_prefixes(declared);
  }

  if known.is_empty() {
    let module_root = vec![module.name().to_string()];
    let outside = names
      .iter()
      .filter(|name| strip_root_prefix(&module_root, name).is_none());
    let mut prefixes = minimize_prefixes(derive_namespaces(outside));
    prefixes.extend(module_root);
    return prefixes;
  }

  minimize_prefixes(derive_namespaces(names))
    .into_iter()
    .map(|prefix| fit_to_layout(prefix, names, known))
    .collect()
}

/// Shorten `prefix` to the depth that turns the most names into recorded files.
///
/// Ties keep the longer prefix; with no match at all the prefix is returned unchanged.
fn fit_to_layout(prefix: String, names: &[String], known: &KnownLayout) -> String {
  let covered: Vec<&String> = names
    .iter()
    .filter(|name| strip_root_prefix(std::slice::from_ref(&prefix), name).is_some())
    .collect();
  let segments: Vec<&str> = prefix.split('.').collect();

  let mut best: Option<(usize, String)> = None;
  for depth in (1..=segments.len()).rev() {
    let candidate = segments[..depth].join(".");
    let matches = covered
      .iter()
      .filter_map(|name| strip_root_prefix(std::slice::from_ref(&candidate), name))
      .filter(|remainder| known.contains_file(remainder))
      .count();
    if matches > best.as_ref().map_or(0, |(count, _)| *count) {
      best = Some((matches, candidate));
    }
  }

  best.map_or(prefix, |(_, candidate)| candidate)
}

fn load_transposition(module: &dyn ResourceModule) -> Option<ProjectTransposition> {
  let text = module.build_metadata()?;
  match BuildMetadata::from_json(module.name(), &text) {
    Ok(metadata) => Some(ProjectTransposition::from_metadata(&metadata)),
    Err(err) => {
      warn!(error = %err, "ignoring build metadata");
      None
    }
  }
}

fn aliases_of(entry: &TranspositionEntry) -> Vec<VirtualPath> {
  entry.aliases().cloned().collect()
}

fn link_aliases(
  builder: &mut FolderBuilder,
  pending: Vec<(Arc<ResourceFile>, Vec<VirtualPath>)>,
) -> usize {
  let mut linked = 0;
  for (file, aliases) in pending {
    for alias in aliases {
      let Some((name, folders)) = alias.segments().split_last() else {
        continue;
      };

      if builder.file(alias.segments()).is_some() {
        debug!(alias = %alias, resource = file.resource_name(), "alias path already occupied");
        continue;
      }

      if builder.insert_file(folders, name, Arc::clone(&file)).is_ok() {
        linked += 1;
      }
    }
  }
  linked
}
