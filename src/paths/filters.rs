use std::sync::OnceLock;

use regex::Regex;

/// Name suffix of the build metadata resource embedded alongside the assets.
pub const METADATA_RESOURCE_NAME: &str = "ResourceMetadata.json";

fn extension_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("invalid extension regex"))
}

fn metadata_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)(^|\.)ResourceMetadata\.json$").expect("invalid metadata resource regex")
  })
}

/// Determine whether a manifest token can serve as a filename extension.
pub fn is_extension_token(token: &str) -> bool {
  extension_pattern().is_match(token)
}

/// Determine whether a manifest resource carries the build metadata rather than an asset.
pub fn is_metadata_resource(resource_name: &str) -> bool {
  metadata_pattern().is_match(resource_name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_plain_extensions() {
    assert!(is_extension_token("js"));
    assert!(is_extension_token("cshtml"));
    assert!(is_extension_token("woff2"));
  }

  #[test]
  fn rejects_empty_or_punctuated_tokens() {
    assert!(!is_extension_token(""));
    assert!(!is_extension_token("j s"));
    assert!(!is_extension_token("a+b"));
  }

  #[test]
  fn recognises_metadata_resources() {
    assert!(is_metadata_resource("RP.Test.Example.ResourceMetadata.json"));
    assert!(is_metadata_resource("resourcemetadata.json"));
    assert!(!is_metadata_resource("RP.Test.Example.OtherResourceMetadata.json"));
    assert!(!is_metadata_resource("RP.Test.Example.folder.Class1.txt"));
  }
}
