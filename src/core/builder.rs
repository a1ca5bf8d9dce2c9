use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use super::{filter, Config, Package};
use crate::resolver::PackageResolver;

/// The result of graph discovery: every reachable, non-ignored package,
/// keyed by canonical import path.
///
/// Edges are not materialized here; they are derived from each package's
/// effective imports at render time, where the ignore policy is re-applied.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    packages: BTreeMap<String, Package>,
}

impl PackageGraph {
    /// Packages in sorted canonical-path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Package)> {
        self.packages.iter()
    }

    pub fn get(&self, canonical_path: &str) -> Option<&Package> {
        self.packages.get(canonical_path)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Depth-first, memoized discovery of the transitive import graph.
///
/// Single-run lifecycle: construct, call [`build`](GraphBuilder::build) once,
/// discard. The `processed` set is keyed on the raw import path (matching
/// resolver semantics before canonicalization); the result map is keyed on
/// the canonical path. Cycles and diamond dependencies short-circuit on the
/// processed check.
pub struct GraphBuilder<'a, R> {
    resolver: &'a R,
    config: &'a Config,
    processed: HashSet<String>,
    packages: BTreeMap<String, Package>,
}

impl<'a, R: PackageResolver> GraphBuilder<'a, R> {
    pub fn new(resolver: &'a R, config: &'a Config) -> Self {
        Self {
            resolver,
            config,
            processed: HashSet::new(),
            packages: BTreeMap::new(),
        }
    }

    /// Resolve every root (in sorted order) and its transitive imports.
    ///
    /// Any resolution failure aborts the whole build; there is no partial
    /// result.
    pub fn build(mut self, base_dir: &Path) -> Result<PackageGraph> {
        let config = self.config;
        for root in &config.roots {
            self.process_package(base_dir, root)?;
        }
        Ok(PackageGraph {
            packages: self.packages,
        })
    }

    fn process_package(&mut self, dir: &Path, import_path: &str) -> Result<()> {
        // Exact-ignore applies before resolution, so intentionally absent
        // packages never produce a resolution error.
        if self.config.ignore_packages.contains(import_path) {
            return Ok(());
        }

        let pkg = self
            .resolver
            .resolve(import_path, dir)
            .with_context(|| {
                format!(
                    "failed to import {} (from {})",
                    import_path,
                    dir.display()
                )
            })?;

        if filter::is_ignored(&pkg, self.config) {
            return Ok(());
        }

        if !self.processed.insert(pkg.import_path.clone()) {
            return Ok(());
        }

        let pkg_dir: PathBuf = pkg.dir.clone();
        let imports = pkg.effective_imports(self.config.include_tests);
        // Stdlib packages are leaves unless explicitly delved into.
        let descend = !pkg.is_stdlib || self.config.delve_stdlib;

        let key = pkg.canonical_path(self.config.unvendor);
        self.packages.insert(key, pkg);

        if descend {
            for imp in &imports {
                if !self.processed.contains(imp) {
                    self.process_package(&pkg_dir, imp)?;
                }
            }
        }
        Ok(())
    }
}
