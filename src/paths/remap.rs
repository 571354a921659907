use std::collections::BTreeSet;
use std::path::MAIN_SEPARATOR_STR;

use tracing::warn;

/// Split a relative path on either slash direction, dropping empty segments.
pub fn split_segments(path: &str) -> Vec<String> {
  path
    .split(['/', '\\'])
    .map(str::trim)
    .filter(|segment| !segment.is_empty())
    .map(str::to_string)
    .collect()
}

/// Join segments with the platform separator used in serialized metadata.
pub fn join_platform(segments: &[String]) -> String {
  segments.join(MAIN_SEPARATOR_STR)
}

/// One positional "from" → "to" folder remapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapPair {
  from: Vec<String>,
  to: Vec<String>,
}

impl RemapPair {
  /// Build a pair from two relative prefixes written with either separator.
  pub fn new(from: &str, to: &str) -> Self {
    Self {
      from: split_segments(from),
      to: split_segments(to),
    }
  }

  fn apply(&self, relative: &[String]) -> Option<Vec<String>> {
    if self.from.is_empty() || relative.len() <= self.from.len() {
      return None;
    }

    if relative[..self.from.len()] != self.from[..] {
      return None;
    }

    let mut remapped = self.to.clone();
    remapped.extend_from_slice(&relative[self.from.len()..]);
    Some(remapped)
  }
}

/// Ordered folder remappings applied while building metadata.
///
/// Matching is segment-aware and case-sensitive: `A/B` matches `A/B/file.txt` but not
/// `A/BC/file.txt`. Pairs are tried in configured order and the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
  pairs: Vec<RemapPair>,
}

impl RemapTable {
  /// Parse two semicolon-delimited lists of prefixes.
  ///
  /// Lists of different lengths disable remapping entirely rather than failing the build.
  pub fn parse(from: &str, to: &str) -> Self {
    let from_list = split_list(from);
    let to_list = split_list(to);

    if from_list.len() != to_list.len() {
      warn!(
        from = from_list.len(),
        to = to_list.len(),
        "remap lists have different lengths, remapping disabled"
      );
      return Self::default();
    }

    Self::from_pairs(
      from_list
        .iter()
        .zip(to_list.iter())
        .map(|(from, to)| RemapPair::new(from, to)),
    )
  }

  /// Build a table from explicit pairs.
  pub fn from_pairs(pairs: impl IntoIterator<Item = RemapPair>) -> Self {
    Self {
      pairs: pairs.into_iter().collect(),
    }
  }

  /// Returns `true` when no remapping is configured.
  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  /// Number of configured pairs.
  pub fn len(&self) -> usize {
    self.pairs.len()
  }

  /// Apply the first matching pair to a relative path.
  pub fn remap(&self, relative: &[String]) -> Option<Vec<String>> {
    self.pairs.iter().find_map(|pair| pair.apply(relative))
  }
}

fn split_list(value: &str) -> Vec<&str> {
  value
    .split(';')
    .map(str::trim)
    .filter(|entry| !entry.is_empty())
    .collect()
}

/// Generate the ordered lookup candidates for a project-relative file path.
///
/// The remapped location, when one applies, comes first and the original relative path is
/// always the final fallback. Paths are written with the platform separator.
pub fn generate_candidates(remaps: &RemapTable, relative_path: &str) -> Vec<String> {
  let segments = split_segments(relative_path);
  if segments.is_empty() {
    return Vec::new();
  }

  let mut builder = CandidateBuilder::new(remaps, segments);
  builder.add_remapped_candidate();
  builder.finish()
}

struct CandidateBuilder<'a> {
  remaps: &'a RemapTable,
  original: Vec<String>,
  seen: BTreeSet<String>,
  result: Vec<String>,
}

impl<'a> CandidateBuilder<'a> {
  fn new(remaps: &'a RemapTable, original: Vec<String>) -> Self {
    Self {
      remaps,
      original,
      seen: BTreeSet::new(),
      result: Vec::new(),
    }
  }

  fn add_remapped_candidate(&mut self) {
    if let Some(remapped) = self.remaps.remap(&self.original) {
      self.push(join_platform(&remapped));
    }
  }

  fn finish(mut self) -> Vec<String> {
    let original = join_platform(&self.original);
    self.push(original);
    self.result
  }

  fn push(&mut self, candidate: String) {
    if self.seen.insert(candidate.clone()) {
      self.result.push(candidate);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn platform(path: &str) -> String {
    path.replace('/', MAIN_SEPARATOR_STR)
  }

  #[test]
  fn keeps_only_original_without_remaps() {
    let candidates = generate_candidates(&RemapTable::default(), "A/B/File1.txt");
    assert_eq!(candidates, vec![platform("A/B/File1.txt")]);
  }

  #[test]
  fn puts_remapped_candidate_first() {
    let remaps = RemapTable::parse("A\\B;A\\C", "Scripts\\A\\B;thirdparty\\src");

    assert_eq!(generate_candidates(&remaps, "A\\B\\File1.txt"), vec![
      platform("Scripts/A/B/File1.txt"),
      platform("A/B/File1.txt"),
    ]);
    assert_eq!(generate_candidates(&remaps, "A/C/File2.txt"), vec![
      platform("thirdparty/src/File2.txt"),
      platform("A/C/File2.txt"),
    ]);
    assert_eq!(generate_candidates(&remaps, "A/File3.txt"), vec![
      platform("A/File3.txt")
    ]);
  }

  #[test]
  fn ignores_leading_separators_in_from_prefixes() {
    let remaps = RemapTable::parse("\\A\\B;/A/C", "Scripts/A/B;thirdparty/src");
    assert_eq!(
      generate_candidates(&remaps, "A/B/File1.txt")[0],
      platform("Scripts/A/B/File1.txt")
    );
    assert_eq!(
      generate_candidates(&remaps, "A/C/File2.txt")[0],
      platform("thirdparty/src/File2.txt")
    );
  }

  #[test]
  fn matches_whole_segments_only() {
    let remaps = RemapTable::parse("A/B", "Scripts");
    assert_eq!(generate_candidates(&remaps, "A/BC/File.txt"), vec![platform("A/BC/File.txt")]);
    assert_eq!(generate_candidates(&remaps, "a/b/File.txt"), vec![platform("a/b/File.txt")]);
  }

  #[test]
  fn first_configured_pair_wins() {
    let remaps = RemapTable::parse("A;A/B", "First;Second");
    assert_eq!(generate_candidates(&remaps, "A/B/File.txt"), vec![
      platform("First/B/File.txt"),
      platform("A/B/File.txt"),
    ]);
  }

  #[test]
  fn mismatched_lists_disable_remapping() {
    let remaps = RemapTable::parse("A;B", "Scripts");
    assert!(remaps.is_empty());
    assert_eq!(generate_candidates(&remaps, "A/File.txt"), vec![platform("A/File.txt")]);
  }

  #[test]
  fn identity_remap_is_deduplicated() {
    let remaps = RemapTable::parse("A", "A");
    assert_eq!(generate_candidates(&remaps, "A/File.txt"), vec![platform("A/File.txt")]);
  }

  #[test]
  fn returns_empty_for_blank_paths() {
    assert!(generate_candidates(&RemapTable::default(), "").is_empty());
    assert!(generate_candidates(&RemapTable::default(), "\\").is_empty());
  }
}
