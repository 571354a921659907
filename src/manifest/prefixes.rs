//! Minimal discriminating namespace prefixes.

use std::collections::{BTreeMap, BTreeSet};

use crate::paths::{is_extension_token, is_metadata_resource};

/// Compute the smallest set of dot-prefixes covering every input exactly once.
///
/// Inputs are clustered by their first segment. Each cluster contributes the longest
/// segment prefix shared by all of its members, so `{Science.Math, Science.Bio}` yields
/// `Science` while a lone `X.Y.Z` yields itself. The result is sorted and does not depend
/// on input order. Blank inputs and empty segments are ignored.
pub fn minimize_prefixes<I, S>(inputs: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let unique: BTreeSet<Vec<String>> = inputs
    .into_iter()
    .map(|input| {
      input
        .as_ref()
        .split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>()
    })
    .filter(|segments| !segments.is_empty())
    .collect();

  let mut clusters: BTreeMap<&str, Vec<&[String]>> = BTreeMap::new();
  for segments in &unique {
    clusters
      .entry(segments[0].as_str())
      .or_default()
      .push(segments.as_slice());
  }

  clusters
    .values()
    .map(|members| common_prefix(members).join("."))
    .collect()
}

fn common_prefix<'a>(members: &[&'a [String]]) -> &'a [String] {
  let first = members[0];
  let mut depth = first.len();
  for member in &members[1..] {
    depth = depth.min(
      first
        .iter()
        .zip(member.iter())
        .take_while(|(left, right)| left == right)
        .count(),
    );
  }
  &first[..depth]
}

/// Candidate namespace of every manifest name: the name without its `stem.extension` tail.
///
/// Metadata resources and names without a recognisable extension yield nothing.
pub fn derive_namespaces<I, S>(resource_names: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  resource_names
    .into_iter()
    .filter_map(|name| {
      let name = name.as_ref();
      if is_metadata_resource(name) {
        return None;
      }
      let tokens: Vec<&str> = name.split('.').collect();
      let extension = tokens.last()?;
      (tokens.len() >= 3 && is_extension_token(extension))
        .then(|| tokens[..tokens.len() - 2].join("."))
    })
    .collect()
}

/// Strip the longest matching root prefix from a manifest name.
///
/// Matching is case-insensitive and only succeeds at a dot boundary. Returns `None` when no
/// prefix applies; a name equal to a prefix leaves nothing behind and also yields `None`.
pub fn strip_root_prefix<'a>(prefixes: &[String], resource_name: &'a str) -> Option<&'a str> {
  prefixes
    .iter()
    .filter(|prefix| !prefix.is_empty())
    .filter_map(|prefix| {
      let head = resource_name.get(..prefix.len())?;
      let rest = resource_name.get(prefix.len()..)?;
      (head.eq_ignore_ascii_case(prefix) && rest.starts_with('.')).then(|| &rest[1..])
    })
    .filter(|rest| !rest.is_empty())
    .min_by_key(|rest| rest.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn yields_one_prefix_per_cluster() {
    let result = minimize_prefixes([
      "A.B",
      "A.B.C",
      "A.B.C.D",
      "A.B.C.E",
      "A.B.C.D.F",
      "Science.Math",
      "Science.Physics",
      "Science.Bio",
      "System",
      "System.IO",
    ]);

    assert_eq!(result, vec!["A.B", "Science", "System"]);
  }

  #[test]
  fn keeps_single_member_clusters_whole() {
    let result = minimize_prefixes([
      "Blacklite.Website",
      "Blacklite.Website.Controllers",
      "Blacklite.Website.Views",
      "Blacklite.Website.Views.ViewName",
      "Science.Math",
      "Science.Physics",
      "Science.Bio",
      "System",
      "System.IO",
      "A.B.C",
      "A.B.C.D",
      "A.B.C.E",
      "A.B.C.D.F",
      "X.Y.Z",
    ]);

    assert_eq!(result, vec![
      "A.B.C",
      "Blacklite.Website",
      "Science",
      "System",
      "X.Y.Z"
    ]);
  }

  #[test]
  fn ignores_blank_input() {
    assert!(minimize_prefixes(Vec::<String>::new()).is_empty());
    assert_eq!(minimize_prefixes(["", " ", "A..B"]), vec!["A.B"]);
  }

  #[test]
  fn strips_longest_prefix_at_dot_boundary() {
    let prefixes = vec!["RP.Test".to_string(), "RP.Test.Example".to_string()];

    assert_eq!(
      strip_root_prefix(&prefixes, "RP.Test.Example.folder.Class1.txt"),
      Some("folder.Class1.txt")
    );
    assert_eq!(strip_root_prefix(&prefixes, "rp.test.Other.txt"), Some("Other.txt"));
    assert_eq!(strip_root_prefix(&prefixes, "RP.Testing.Class1.txt"), None);
    assert_eq!(strip_root_prefix(&prefixes, "RP.Test"), None);
  }

  #[test]
  fn derives_namespaces_by_dropping_file_names() {
    let derived = derive_namespaces([
      "Example.Web.folder.Class1.txt",
      "Example.Web.Class1.css",
      "Example.Web.ResourceMetadata.json",
      "README",
      "Example.LICENSE",
    ]);
    assert_eq!(derived, vec!["Example.Web.folder", "Example.Web"]);
  }

  fn covering_prefixes<'a>(prefixes: &'a [String], input: &str) -> Vec<&'a String> {
    let normalised: Vec<&str> = input.split('.').filter(|s| !s.is_empty()).collect();
    let joined = normalised.join(".");
    prefixes
      .iter()
      .filter(|prefix| joined == **prefix || joined.starts_with(&format!("{prefix}.")))
      .collect()
  }

  proptest! {
    #[test]
    fn result_is_independent_of_input_order(
      inputs in prop::collection::vec("[a-c](\\.[a-c]){0,3}", 1..12)
    ) {
      let forward = minimize_prefixes(&inputs);
      let mut reversed = inputs.clone();
      reversed.reverse();
      prop_assert_eq!(forward, minimize_prefixes(&reversed));
    }

    #[test]
    fn every_input_is_covered_exactly_once(
      inputs in prop::collection::vec("[a-c](\\.[a-c]){0,3}", 1..12)
    ) {
      let prefixes = minimize_prefixes(&inputs);
      for input in &inputs {
        prop_assert_eq!(covering_prefixes(&prefixes, input).len(), 1, "input {}", input);
      }
    }
  }
}
