//! Splitting dotted manifest names back into folder and file segments.
//!
//! A manifest name such as `folder.with.dots.Class1.js` is ambiguous: every dot may be a
//! folder separator or a literal character. Names are resolved in three steps:
//!
//! 1. An exact match against a project path recorded in the build metadata wins.
//! 2. Otherwise the filename is grown one token at a time starting from `stem.ext`, and for
//!    each length the remaining tokens are partitioned into folders known from the metadata.
//!    The partition search tries the deepest nesting first and backtracks on unknown folders.
//! 3. Without a usable match every token before `stem.ext` becomes its own folder.

use std::collections::{HashMap, HashSet};

use crate::paths::{VirtualPath, is_extension_token};

/// Folder and file layout known from a module's build metadata.
#[derive(Debug, Clone, Default)]
pub struct KnownLayout {
  files: HashMap<String, Vec<String>>,
  folders: HashSet<String>,
}

impl KnownLayout {
  /// Collect the layout from project-relative file paths.
  pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a VirtualPath>) -> Self {
    let mut layout = Self::default();
    for path in paths {
      let segments = path.segments();
      if segments.is_empty() {
        continue;
      }

      layout
        .files
        .insert(segments.join(".").to_lowercase(), segments.to_vec());

      for depth in 1..segments.len() {
        layout.folders.insert(folder_key(&segments[..depth]));
      }
    }
    layout
  }

  /// Returns `true` when nothing is known about the module layout.
  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Returns `true` when a dotted name such as `folder.Class1.txt` spells a recorded file.
  pub fn contains_file(&self, dotted: &str) -> bool {
    self.files.contains_key(&dotted.to_lowercase())
  }

  fn contains_folder(&self, segments: &[String]) -> bool {
    self.folders.contains(&folder_key(segments))
  }
}

fn folder_key(segments: &[String]) -> String {
  segments.join("/").to_lowercase()
}

/// A manifest name split into its folder path and file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
  /// Folder segments from the tree root.
  pub folders: Vec<String>,
  /// File name including its extension.
  pub file_name: String,
}

impl ResolvedName {
  /// The full virtual path of the file.
  pub fn virtual_path(&self) -> VirtualPath {
    self
      .folders
      .iter()
      .fold(VirtualPath::root(), |path, folder| path.join(folder))
      .join(&self.file_name)
  }
}

/// Resolve a manifest name with its root namespace already removed.
///
/// Returns `None` when the name has no recognisable `stem.extension` tail.
pub fn resolve_name(remainder: &str, known: &KnownLayout) -> Option<ResolvedName> {
  let tokens: Vec<String> = remainder.split('.').map(str::to_string).collect();
  let count = tokens.len();
  if count < 2 || tokens.iter().any(String::is_empty) || !is_extension_token(&tokens[count - 1]) {
    return None;
  }

  if let Some(segments) = known.files.get(&remainder.to_lowercase()) {
    let (file_name, folders) = segments.split_last()?;
    return Some(ResolvedName {
      folders: folders.to_vec(),
      file_name: file_name.clone(),
    });
  }

  if !known.is_empty() {
    for file_len in 2..count {
      let folder_tokens = &tokens[..count - file_len];
      if let Some(folders) = partition_folders(folder_tokens, &mut Vec::new(), known) {
        return Some(ResolvedName {
          folders,
          file_name: tokens[count - file_len..].join("."),
        });
      }
    }
  }

  Some(ResolvedName {
    folders: tokens[..count - 2].to_vec(),
    file_name: tokens[count - 2..].join("."),
  })
}

fn partition_folders(
  tokens: &[String],
  parent: &mut Vec<String>,
  known: &KnownLayout,
) -> Option<Vec<String>> {
  if tokens.is_empty() {
    return Some(Vec::new());
  }

  for take in 1..=tokens.len() {
    let name = tokens[..take].join(".");
    parent.push(name.clone());
    let rest = if known.contains_folder(parent) {
      partition_folders(&tokens[take..], parent, known)
    } else {
      None
    };
    parent.pop();

    if let Some(mut rest) = rest {
      rest.insert(0, name);
      return Some(rest);
    }
  }

  None
}

#[cfg(test)]
mod tests {
  use super::*;

  fn known(paths: &[&str]) -> KnownLayout {
    let parsed: Vec<VirtualPath> = paths
      .iter()
      .map(|path| VirtualPath::parse(path).unwrap())
      .collect();
    KnownLayout::from_paths(&parsed)
  }

  fn resolved(remainder: &str, layout: &KnownLayout) -> String {
    resolve_name(remainder, layout)
      .map(|name| name.virtual_path().display())
      .unwrap_or_default()
  }

  #[test]
  fn splits_every_dot_without_metadata() {
    let layout = KnownLayout::default();
    assert_eq!(resolved("folder.Class1.txt", &layout), "folder/Class1.txt");
    assert_eq!(resolved("a.b.c.txt", &layout), "a/b/c.txt");
    assert_eq!(resolved("Class1.css", &layout), "Class1.css");
  }

  #[test]
  fn prefers_exact_metadata_paths() {
    let layout = known(&["folder\\Class1.txt", "folder.with.dots\\Class1.js", "jquery.min.js"]);
    assert_eq!(resolved("folder.with.dots.Class1.js", &layout), "folder.with.dots/Class1.js");
    assert_eq!(resolved("FOLDER.Class1.txt", &layout), "folder/Class1.txt");
    assert_eq!(resolved("jquery.min.js", &layout), "jquery.min.js");
  }

  #[test]
  fn backtracks_into_dotted_folder_names() {
    let layout = known(&["folder/Class1.txt", "folder.with.dots/Class1.js"]);
    assert_eq!(resolved("folder.with.dots.Other.js", &layout), "folder.with.dots/Other.js");
  }

  #[test]
  fn grows_the_file_name_when_folders_do_not_match() {
    let layout = known(&["scripts/app.js"]);
    assert_eq!(resolved("scripts.jquery.min.js", &layout), "scripts/jquery.min.js");
  }

  #[test]
  fn prefers_deeper_nesting_between_known_folders() {
    let layout = known(&["a/b/one.txt", "a.b/two.txt"]);
    assert_eq!(resolved("a.b.c.txt", &layout), "a/b/c.txt");
  }

  #[test]
  fn falls_back_when_no_known_folder_matches() {
    let layout = known(&["other/file.txt"]);
    assert_eq!(resolved("x.y.file.txt", &layout), "x/y/file.txt");
  }

  #[test]
  fn rejects_names_without_extension() {
    let layout = KnownLayout::default();
    assert!(resolve_name("README", &layout).is_none());
    assert!(resolve_name("folder.", &layout).is_none());
    assert!(resolve_name("folder..txt", &layout).is_none());
    assert!(resolve_name("folder.Class1.t x t", &layout).is_none());
  }
}
