//! Overlay of the embedded tree with files that exist on disk.

mod merge;
mod overrides;

pub use merge::{
  FileSource, FolderSource, MergedDirectory, OverlayFile, OverlayFolder, OverlayResolver,
};
pub use overrides::PhysicalOverrides;
