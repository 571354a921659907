//! Helpers for normalising virtual paths and expanding project paths into lookup candidates.
//!
//! The responsibilities are split into focused submodules so that path normalisation,
//! manifest token filtering and remap candidate generation can be tested independently.
//! The same code is shared between the build-time metadata generator and the runtime
//! provider.

mod filters;
mod normalize;
mod remap;

pub use filters::{METADATA_RESOURCE_NAME, is_extension_token, is_metadata_resource};
pub use normalize::{VirtualPath, lookup_key};
pub use remap::{RemapPair, RemapTable, generate_candidates, join_platform, split_segments};
