use std::collections::HashSet;
use std::path::PathBuf;

/// Path segment marking a vendored copy of an external package.
const VENDOR_MARKER: &str = "/vendor/";

/// Metadata for one resolved Go package.
///
/// Produced by a [`PackageResolver`](crate::resolver::PackageResolver),
/// owned by the builder's result map and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Import path as reported by the resolver, before canonicalization.
    pub import_path: String,
    /// Source directory; base for resolving this package's own imports.
    pub dir: PathBuf,
    /// Part of the standard distribution (found under GOROOT).
    pub is_stdlib: bool,
    /// At least one buildable file imports the "C" pseudo-package.
    pub has_cgo: bool,
    /// Direct imports, in resolver-reported order.
    pub imports: Vec<String>,
    /// Imports appearing only in `_test.go` files of the package itself.
    pub test_imports: Vec<String>,
    /// Imports of the external test package (`package foo_test`).
    pub xtest_imports: Vec<String>,
}

impl Package {
    /// The identity used for map keys and display labels.
    ///
    /// With `unvendor` set, a non-stdlib path containing a `/vendor/`
    /// segment is rewritten to everything after the marker, recovering the
    /// dependency's original import path. Resolution always uses the raw
    /// path; only keys, labels and ignore checks see the canonical form.
    pub fn canonical_path(&self, unvendor: bool) -> String {
        if unvendor && !self.is_stdlib {
            if let Some(idx) = self.import_path.find(VENDOR_MARKER) {
                return self.import_path[idx + VENDOR_MARKER.len()..].to_string();
            }
        }
        self.import_path.clone()
    }

    /// Imports to traverse and render for this package.
    ///
    /// Direct imports first, then test and external-test imports when
    /// requested. Duplicates keep their first occurrence; a reference to the
    /// package's own import path (external tests importing the package under
    /// test) is dropped so no self-loop is ever drawn.
    pub fn effective_imports(&self, include_tests: bool) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        let test_lists = if include_tests {
            &[&self.test_imports, &self.xtest_imports][..]
        } else {
            &[][..]
        };

        for list in std::iter::once(&self.imports).chain(test_lists.iter().copied()) {
            for imp in list {
                if imp == &self.import_path {
                    continue;
                }
                if seen.insert(imp.as_str()) {
                    out.push(imp.clone());
                }
            }
        }
        out
    }
}
