use std::fmt;

use crate::error::PathError;

/// A virtual path reduced to its segments.
///
/// Leading `~` markers and separators are stripped, both slash directions are accepted and
/// empty or `.` segments are dropped. The original casing is kept for display while
/// [`VirtualPath::key`] provides the case-folded form used for every comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualPath {
  segments: Vec<String>,
}

impl VirtualPath {
  /// Normalize a caller supplied path.
  ///
  /// Empty input is rejected instead of being treated as the root; use `"/"` or `"~/"` to
  /// address the root explicitly.
  pub fn parse(raw: &str) -> Result<Self, PathError> {
    if raw.trim().is_empty() {
      return Err(PathError::Empty);
    }

    let trimmed = raw.trim().trim_start_matches('~');
    let mut segments = Vec::new();
    for segment in trimmed.split(['/', '\\']) {
      match segment.trim() {
        "" | "." => continue,
        ".." => return Err(PathError::Traversal(raw.to_string())),
        value => segments.push(value.to_string()),
      }
    }

    Ok(Self { segments })
  }

  /// The root path.
  pub fn root() -> Self {
    Self {
      segments: Vec::new(),
    }
  }

  /// Returns `true` when the path addresses the root.
  pub fn is_root(&self) -> bool {
    self.segments.is_empty()
  }

  /// Path segments in their original casing.
  pub fn segments(&self) -> &[String] {
    &self.segments
  }

  /// Final segment, if any.
  pub fn file_name(&self) -> Option<&str> {
    self.segments.last().map(String::as_str)
  }

  /// Returns `true` when the final segment carries an extension.
  ///
  /// Folders and files are disjoint namespaces: a bare name such as `folder` never
  /// addresses a file.
  pub fn has_extension(&self) -> bool {
    self.file_name().is_some_and(|name| {
      name
        .rfind('.')
        .is_some_and(|index| index > 0 && index + 1 < name.len())
    })
  }

  /// Case-folded, slash-joined form used as a lookup key.
  pub fn key(&self) -> String {
    self.display().to_lowercase()
  }

  /// Slash-joined form without a leading separator.
  pub fn display(&self) -> String {
    self.segments.join("/")
  }

  /// Rooted form, e.g. `/folder/file.txt`.
  pub fn rooted(&self) -> String {
    format!("/{}", self.display())
  }

  /// Append a child segment.
  pub fn join(&self, segment: &str) -> Self {
    let mut segments = self.segments.clone();
    segments.push(segment.to_string());
    Self { segments }
  }
}

impl fmt::Display for VirtualPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.rooted())
  }
}

/// Case-folded lookup key for a raw path, or `None` when the input is invalid.
pub fn lookup_key(raw: &str) -> Option<String> {
  VirtualPath::parse(raw).ok().map(|path| path.key())
}
