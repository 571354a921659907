#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

#[cfg(not(target_arch = "wasm32"))]
pub mod builder;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod module;
#[cfg(not(target_arch = "wasm32"))]
pub mod overlay;
pub mod paths;
pub mod provider;
pub mod tree;

#[cfg(not(target_arch = "wasm32"))]
pub use builder::{
  BuildResult, MetadataBuilder, collect_embeddable_files, collect_project_files, write_metadata,
};
pub use config::{OverlayConfig, ProjectConfig};
pub use error::{MetadataError, PathError};
pub use models::{BuildMetadata, TranspositionTable};
pub use module::{EmbeddedModule, ResourceModule};
#[cfg(not(target_arch = "wasm32"))]
pub use overlay::{MergedDirectory, OverlayFile, OverlayResolver, PhysicalOverrides};
pub use paths::VirtualPath;
pub use provider::ResourceProvider;
pub use tree::{ResourceEntry, ResourceFile, ResourceFolder};
