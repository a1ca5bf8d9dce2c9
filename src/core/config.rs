use std::collections::HashSet;

/// Immutable configuration for a single run.
///
/// Built once by the CLI layer and shared by the builder, the ignore policy
/// and the formatter. Roots are sorted and deduplicated so traversal order
/// (and therefore output) is deterministic regardless of argument order.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root import paths, sorted and deduplicated.
    pub roots: Vec<String>,
    /// Drop standard-library packages from the output entirely.
    pub ignore_stdlib: bool,
    /// Descend into the imports of standard-library packages.
    pub delve_stdlib: bool,
    /// Import path prefixes to ignore.
    pub ignore_prefixes: Vec<String>,
    /// Exact import paths to ignore.
    pub ignore_packages: HashSet<String>,
    /// Build tags considered satisfied during resolution.
    pub build_tags: Vec<String>,
    /// Lay the graph out horizontally instead of vertically.
    pub horizontal: bool,
    /// Include test and external-test imports.
    pub include_tests: bool,
    /// Strip vendor prefixes from package import paths.
    pub unvendor: bool,
}

impl Config {
    pub fn new(roots: impl IntoIterator<Item = String>) -> Self {
        let mut roots: Vec<String> = roots.into_iter().collect();
        roots.sort();
        roots.dedup();

        // The cgo pseudo-package "C" never resolves to a directory.
        let mut ignore_packages = HashSet::new();
        ignore_packages.insert("C".to_string());

        Self {
            roots,
            ignore_stdlib: false,
            delve_stdlib: false,
            ignore_prefixes: Vec::new(),
            ignore_packages,
            build_tags: Vec::new(),
            horizontal: false,
            include_tests: false,
            unvendor: false,
        }
    }

    /// Whether `import_path` names one of the roots, as given on the
    /// command line (no canonicalization).
    pub fn is_root(&self, import_path: &str) -> bool {
        self.roots.iter().any(|r| r == import_path)
    }
}
