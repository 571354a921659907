//! Manifest indexing broken into focused submodules for easier testing.

mod indexing;
mod naming;
mod prefixes;

pub use indexing::{ManifestIndex, index_modules};
pub use naming::{KnownLayout, ResolvedName, resolve_name};
pub use prefixes::{minimize_prefixes, strip_root_prefix};
