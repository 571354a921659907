//! Data structures produced at build time and the lookup tables derived from them.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MetadataError;
use crate::paths::VirtualPath;

/// Serialized build metadata describing how project files were embedded.
///
/// The field names match the JSON written by the metadata generator:
/// `{"Files": {"path": ["candidate", ...]}, "ProjectPath": "..\\Project\\"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildMetadata {
  /// Project-relative file path mapped to its ordered lookup candidates.
  #[serde(rename = "Files", default)]
  pub files: BTreeMap<String, Vec<String>>,
  /// Project root relative to the host directory, written as up-navigation segments.
  #[serde(rename = "ProjectPath", default)]
  pub project_path: String,
}

impl BuildMetadata {
  /// Serialize to compact JSON.
  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string(self)
  }

  /// Serialize to indented JSON.
  pub fn to_json_pretty(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }

  /// Parse metadata carried by the named module.
  pub fn from_json(module: &str, text: &str) -> Result<Self, MetadataError> {
    serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(|source| {
      MetadataError::Parse {
        module: module.to_string(),
        source,
      }
    })
  }
}

/// Ordered lookup candidates for one embedded project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspositionEntry {
  /// Original project-relative path the file was embedded from.
  pub relative_path: VirtualPath,
  /// Candidates to try in order; the original path is always last.
  pub candidates: Vec<VirtualPath>,
}

impl TranspositionEntry {
  /// Alternative names this file is also known by, excluding the original path.
  pub fn aliases(&self) -> impl Iterator<Item = &VirtualPath> {
    let original = self.relative_path.key();
    self
      .candidates
      .iter()
      .filter(move |candidate| candidate.key() != original)
  }
}

/// Transpositions for one project, keyed by case-folded path.
#[derive(Debug, Clone, Default)]
pub struct ProjectTransposition {
  project_path: String,
  entries: BTreeMap<String, TranspositionEntry>,
  aliases: HashMap<String, String>,
}

impl ProjectTransposition {
  /// Build the lookup structure from deserialized metadata.
  ///
  /// Candidate lists are repaired so that the original path is always the final fallback,
  /// and unusable paths are dropped with a diagnostic.
  pub fn from_metadata(metadata: &BuildMetadata) -> Self {
    let mut entries = BTreeMap::new();

    for (relative, candidates) in &metadata.files {
      let Ok(relative_path) = VirtualPath::parse(relative) else {
        warn!(path = %relative, "skipping unusable metadata path");
        continue;
      };
      let original_key = relative_path.key();

      let mut ordered: Vec<VirtualPath> = Vec::new();
      for candidate in candidates {
        match VirtualPath::parse(candidate) {
          Ok(path) if path.key() != original_key => {
            if !ordered.iter().any(|seen| seen.key() == path.key()) {
              ordered.push(path);
            }
          }
          Ok(_) => {}
          Err(err) => warn!(path = %candidate, error = %err, "skipping unusable candidate"),
        }
      }
      ordered.push(relative_path.clone());

      entries.insert(original_key, TranspositionEntry {
        relative_path,
        candidates: ordered,
      });
    }

    let mut aliases = HashMap::new();
    for (key, entry) in &entries {
      for alias in entry.aliases() {
        let alias_key = alias.key();
        if entries.contains_key(&alias_key) {
          continue;
        }
        aliases.entry(alias_key).or_insert_with(|| key.clone());
      }
    }

    Self {
      project_path: metadata.project_path.clone(),
      entries,
      aliases,
    }
  }

  /// Project root relative to the host directory.
  pub fn project_path(&self) -> &str {
    &self.project_path
  }

  /// Entry for the original path or any of its aliases.
  pub fn lookup(&self, key: &str) -> Option<&TranspositionEntry> {
    self.entries.get(key).or_else(|| {
      self
        .aliases
        .get(key)
        .and_then(|original| self.entries.get(original))
    })
  }

  /// All entries ordered by original path.
  pub fn entries(&self) -> impl Iterator<Item = &TranspositionEntry> {
    self.entries.values()
  }

  /// Number of files described.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when no files are described.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Transpositions of every loaded project, keyed by module name.
#[derive(Debug, Clone, Default)]
pub struct TranspositionTable {
  roots: BTreeMap<String, ProjectTransposition>,
}

impl TranspositionTable {
  /// Register the transpositions of one module.
  pub fn insert(&mut self, module: impl Into<String>, transposition: ProjectTransposition) {
    self.roots.insert(module.into(), transposition);
  }

  /// Transpositions registered for a module.
  pub fn get(&self, module: &str) -> Option<&ProjectTransposition> {
    self.roots.get(module)
  }

  /// Find the entry for a case-folded path across all modules.
  pub fn lookup(&self, key: &str) -> Option<(&str, &TranspositionEntry)> {
    self
      .roots
      .iter()
      .find_map(|(module, project)| project.lookup(key).map(|entry| (module.as_str(), entry)))
  }

  /// Number of modules with transpositions.
  pub fn len(&self) -> usize {
    self.roots.len()
  }

  /// Returns `true` when no module carried metadata.
  pub fn is_empty(&self) -> bool {
    self.roots.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn metadata() -> BuildMetadata {
    let mut files = BTreeMap::new();
    files.insert("folder\\Class1.txt".to_string(), vec![
      "Content\\Class1.txt".to_string(),
      "folder\\Class1.txt".to_string(),
    ]);
    files.insert("folder.with.dots\\Class1.js".to_string(), vec![
      "Scripts\\Class1.js".to_string(),
      "folder.with.dots\\Class1.js".to_string(),
    ]);
    files.insert("Class1.css".to_string(), vec!["Class1.css".to_string()]);
    BuildMetadata {
      files,
      project_path: "..\\RP.Test.Example\\".to_string(),
    }
  }

  #[test]
  fn serializes_with_pascal_case_fields() {
    let mut files = BTreeMap::new();
    files.insert("A\\File3.txt".to_string(), vec!["A\\File3.txt".to_string()]);
    let metadata = BuildMetadata {
      files,
      project_path: "..\\".to_string(),
    };

    assert_eq!(
      metadata.to_json().unwrap(),
      r#"{"Files":{"A\\File3.txt":["A\\File3.txt"]},"ProjectPath":"..\\"}"#
    );
  }

  #[test]
  fn reports_module_name_on_parse_failure() {
    let err = BuildMetadata::from_json("Broken.Module", "{ nope").unwrap_err();
    assert!(err.to_string().contains("Broken.Module"));
  }

  #[test]
  fn tolerates_missing_fields() {
    let metadata = BuildMetadata::from_json("m", "{}").unwrap();
    assert!(metadata.files.is_empty());
    assert!(metadata.project_path.is_empty());
  }

  #[test]
  fn resolves_aliases_to_original_entries() {
    let project = ProjectTransposition::from_metadata(&metadata());

    let entry = project.lookup("scripts/class1.js").unwrap();
    assert_eq!(entry.relative_path.display(), "folder.with.dots/Class1.js");
    assert_eq!(entry.candidates.len(), 2);
    assert_eq!(entry.candidates[0].display(), "Scripts/Class1.js");
    assert_eq!(entry.candidates[1].display(), "folder.with.dots/Class1.js");

    assert!(project.lookup("folder/class1.txt").is_some());
    assert!(project.lookup("missing.txt").is_none());
    assert_eq!(project.project_path(), "..\\RP.Test.Example\\");
  }

  #[test]
  fn repairs_candidate_lists_without_original() {
    let mut files = BTreeMap::new();
    files.insert("a/b.txt".to_string(), vec!["c/b.txt".to_string()]);
    files.insert("d.txt".to_string(), Vec::new());
    let project = ProjectTransposition::from_metadata(&BuildMetadata {
      files,
      project_path: String::new(),
    });

    let entry = project.lookup("a/b.txt").unwrap();
    let displayed: Vec<String> = entry.candidates.iter().map(VirtualPath::display).collect();
    assert_eq!(displayed, vec!["c/b.txt", "a/b.txt"]);

    let entry = project.lookup("d.txt").unwrap();
    assert_eq!(entry.candidates.len(), 1);
  }

  #[test]
  fn original_paths_win_over_colliding_aliases() {
    let mut files = BTreeMap::new();
    files.insert("a.txt".to_string(), vec!["b.txt".to_string(), "a.txt".to_string()]);
    files.insert("b.txt".to_string(), vec!["b.txt".to_string()]);
    let project = ProjectTransposition::from_metadata(&BuildMetadata {
      files,
      project_path: String::new(),
    });

    assert_eq!(project.lookup("b.txt").unwrap().relative_path.display(), "b.txt");
  }

  #[test]
  fn table_searches_every_module() {
    let mut table = TranspositionTable::default();
    table.insert("First", ProjectTransposition::default());
    table.insert("Second", ProjectTransposition::from_metadata(&metadata()));

    let (module, entry) = table.lookup("content/class1.txt").unwrap();
    assert_eq!(module, "Second");
    assert_eq!(entry.relative_path.display(), "folder/Class1.txt");
    assert_eq!(table.len(), 2);
  }
}
