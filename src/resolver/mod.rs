pub mod constraints;
pub mod gosrc;

use anyhow::Result;
use std::path::Path;

use crate::core::Package;

pub use gosrc::GoSourceResolver;

/// Resolves an import path to package metadata.
///
/// The builder depends on this seam instead of the filesystem directly, so
/// traversal semantics are testable against synthetic graphs. `base_dir` is
/// the directory of the importing package (or the working directory for
/// roots); it anchors vendor and relative-path lookup.
pub trait PackageResolver {
    fn resolve(&self, import_path: &str, base_dir: &Path) -> Result<Package>;
}
